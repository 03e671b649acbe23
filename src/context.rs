//! Tool context: the policy and service state threaded through every call.
//!
//! One context is built per agent run and passed by reference into each tool
//! invocation. Tools only ever read it; there is no process-wide default, so
//! agents with different policies can run side by side.

use crate::approval::{self, ApprovalCallback, ApprovalDecision, ApprovalRequest};
use crate::types::{Config, Error, Result, ToolLimits, WebServiceConfig};
use std::collections::HashSet;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Runtime context for tool invocations.
#[derive(Clone)]
pub struct ToolContext {
    work_dir: PathBuf,
    yolo_mode: bool,
    auto_approved_actions: HashSet<String>,
    approval_callback: Option<Arc<dyn ApprovalCallback>>,
    search_service: Option<WebServiceConfig>,
    fetch_service: Option<WebServiceConfig>,
    limits: ToolLimits,
    http: reqwest::Client,
}

impl fmt::Debug for ToolContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolContext")
            .field("work_dir", &self.work_dir)
            .field("yolo_mode", &self.yolo_mode)
            .field("auto_approved_actions", &self.auto_approved_actions)
            .field("approval_callback", &self.approval_callback.is_some())
            .field("search_service", &self.search_service)
            .field("fetch_service", &self.fetch_service)
            .field("limits", &self.limits)
            .finish()
    }
}

impl ToolContext {
    /// Create a context rooted at `work_dir`.
    ///
    /// Fails with a configuration error unless `work_dir` exists and is a
    /// directory. The stored path is canonical (absolute).
    pub fn new(work_dir: impl AsRef<Path>) -> Result<Self> {
        Self::with_http(work_dir, reqwest::Client::new())
    }

    /// Build a context from loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let work_dir = match &config.context.work_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()
                .map_err(|e| Error::config(format!("cannot determine current directory: {}", e)))?,
        };

        let http = reqwest::Client::builder()
            .timeout(config.web.request_timeout)
            .user_agent(config.web.user_agent.clone())
            .build()
            .map_err(|e| Error::config(format!("cannot build http client: {}", e)))?;

        let mut ctx = Self::with_http(work_dir, http)?
            .with_yolo_mode(config.context.yolo_mode)
            .with_auto_approved_actions(config.context.auto_approved_actions.iter().cloned())
            .with_limits(config.limits.clone());
        ctx.search_service = config.web.search.clone();
        ctx.fetch_service = config.web.fetch.clone();
        Ok(ctx)
    }

    fn with_http(work_dir: impl AsRef<Path>, http: reqwest::Client) -> Result<Self> {
        let work_dir = work_dir.as_ref();
        let meta = std::fs::metadata(work_dir).map_err(|e| {
            Error::config(format!(
                "work_dir {} is not accessible: {}",
                work_dir.display(),
                e
            ))
        })?;
        if !meta.is_dir() {
            return Err(Error::config(format!(
                "work_dir {} is not a directory",
                work_dir.display()
            )));
        }
        let work_dir = work_dir.canonicalize().map_err(|e| {
            Error::config(format!("cannot canonicalize {}: {}", work_dir.display(), e))
        })?;

        Ok(Self {
            work_dir,
            yolo_mode: false,
            auto_approved_actions: HashSet::new(),
            approval_callback: None,
            search_service: None,
            fetch_service: None,
            limits: ToolLimits::default(),
            http,
        })
    }

    pub fn with_yolo_mode(mut self, yolo_mode: bool) -> Self {
        self.yolo_mode = yolo_mode;
        self
    }

    pub fn with_auto_approved_actions<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.auto_approved_actions
            .extend(actions.into_iter().map(Into::into));
        self
    }

    pub fn with_approval_callback(mut self, callback: impl ApprovalCallback + 'static) -> Self {
        self.approval_callback = Some(Arc::new(callback));
        self
    }

    /// Share an already reference-counted callback between contexts.
    pub fn with_shared_approval_callback(mut self, callback: Arc<dyn ApprovalCallback>) -> Self {
        self.approval_callback = Some(callback);
        self
    }

    pub fn with_search_service(mut self, service: WebServiceConfig) -> Self {
        self.search_service = Some(service);
        self
    }

    pub fn with_fetch_service(mut self, service: WebServiceConfig) -> Self {
        self.fetch_service = Some(service);
        self
    }

    pub fn with_limits(mut self, limits: ToolLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Add an action label to the auto-approved set.
    ///
    /// Caller-side only: call it before the context is handed to tools.
    pub fn approve_action(&mut self, action: impl Into<String>) {
        self.auto_approved_actions.insert(action.into());
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn yolo_mode(&self) -> bool {
        self.yolo_mode
    }

    pub fn is_auto_approved(&self, action: &str) -> bool {
        self.auto_approved_actions.contains(action)
    }

    pub fn approval_callback(&self) -> Option<&Arc<dyn ApprovalCallback>> {
        self.approval_callback.as_ref()
    }

    pub fn search_service(&self) -> Option<&WebServiceConfig> {
        self.search_service.as_ref()
    }

    pub fn fetch_service(&self) -> Option<&WebServiceConfig> {
        self.fetch_service.as_ref()
    }

    pub fn limits(&self) -> &ToolLimits {
        &self.limits
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Ask whether a gated action may proceed.
    pub async fn request_approval(
        &self,
        tool_name: &str,
        action: &str,
        description: &str,
    ) -> ApprovalDecision {
        approval::resolve(self, &ApprovalRequest::new(tool_name, action, description)).await
    }

    /// Resolve a tool-supplied path against `work_dir`.
    ///
    /// Relative paths are joined onto `work_dir`; `.` and `..` components are
    /// folded lexically without touching the filesystem.
    pub fn resolve_path(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        let joined = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.work_dir.join(path)
        };
        normalize(&joined)
    }

    /// Resolve `path` to where the filesystem will actually put it.
    ///
    /// Starts from [`resolve_path`](Self::resolve_path), then follows symlinks
    /// in the longest prefix that exists. Trailing components that do not
    /// exist yet are appended unchanged. A dangling symlink is an error since
    /// its target cannot be checked.
    pub fn real_path(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let lexical = self.resolve_path(path);
        let mut existing = lexical.as_path();
        let mut missing = Vec::new();
        loop {
            match existing.canonicalize() {
                Ok(mut real) => {
                    real.extend(missing.into_iter().rev());
                    return Ok(real);
                }
                Err(e) if e.kind() != std::io::ErrorKind::NotFound => return Err(Error::Io(e)),
                Err(_) if existing.symlink_metadata().is_ok() => {
                    return Err(Error::validation(format!(
                        "`{}` is a dangling symbolic link",
                        existing.display()
                    )));
                }
                Err(_) => match (existing.parent(), existing.file_name()) {
                    (Some(parent), Some(name)) => {
                        missing.push(name);
                        existing = parent;
                    }
                    _ => return Ok(lexical),
                },
            }
        }
    }

    /// True if `path` lies inside `work_dir` once symlinks are followed.
    pub fn is_within_work_dir(&self, path: impl AsRef<Path>) -> bool {
        self.real_path(path)
            .map(|real| real.starts_with(&self.work_dir))
            .unwrap_or(false)
    }
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
