//! Authenticated request gateway: bearer injection plus a bounded refresh-and-retry cycle.

pub mod execute;
pub mod refresh;
pub mod session;

pub use execute::*;
pub use refresh::*;
pub use session::*;

// self
use crate::{
	_prelude::*,
	config::ApiConfig,
	http::{HttpTransport, ReqwestTransport},
	store::SessionStore,
};

/// Gateway specialized for the crate's default reqwest transport.
pub type ReqwestGateway = Gateway<ReqwestTransport>;

/// Boxed future returned by [`SessionTerminator::terminate`].
pub type TerminateFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + 'a + Send>>;

/// Capability invoked once the gateway decides the session can no longer be recovered.
///
/// What termination means (clearing storage, flipping application state, navigating) is up
/// to the implementor; the gateway only calls it and then fails with
/// [`Error::Unauthorized`].
pub trait SessionTerminator
where
	Self: Send + Sync,
{
	/// Tears the session down.
	fn terminate(&self) -> TerminateFuture<'_>;
}
impl<F, Fut> SessionTerminator for F
where
	F: Send + Sync + Fn() -> Fut,
	Fut: 'static + Send + Future<Output = Result<()>>,
{
	fn terminate(&self) -> TerminateFuture<'_> {
		Box::pin(self())
	}
}

/// Executes API calls on behalf of the signed-in user.
///
/// The gateway owns the transport, the injected session store, and the endpoint layout.
/// Every call reads the current tokens from the store; nothing is cached between calls.
pub struct Gateway<T>
where
	T: ?Sized + HttpTransport,
{
	/// Transport used for every outbound request, including token endpoints.
	pub transport: Arc<T>,
	/// Session store holding `accessToken` and `refreshToken`.
	pub store: Arc<dyn SessionStore>,
	/// API location and endpoint paths.
	pub config: ApiConfig,
	/// Shared counters for refresh outcomes.
	pub refresh_metrics: Arc<RefreshMetrics>,
	refresh_guard: Option<Arc<AsyncMutex<()>>>,
}
impl<T> Gateway<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a gateway that reuses the caller-provided transport.
	pub fn with_transport(
		store: Arc<dyn SessionStore>,
		config: ApiConfig,
		transport: impl Into<Arc<T>>,
	) -> Self {
		Self {
			transport: transport.into(),
			store,
			config,
			refresh_metrics: Default::default(),
			refresh_guard: None,
		}
	}

	/// Serializes refreshes across calls sharing this gateway (and its clones).
	///
	/// A call that was rejected with a token another call has already replaced retries with
	/// the stored token instead of refreshing again.
	pub fn with_refresh_coalescing(mut self) -> Self {
		self.refresh_guard = Some(Arc::new(AsyncMutex::new(())));

		self
	}

	/// Returns `true` when refresh coalescing is enabled.
	pub fn coalesces_refresh(&self) -> bool {
		self.refresh_guard.is_some()
	}
}
impl Gateway<ReqwestTransport> {
	/// Creates a gateway backed by a default reqwest client.
	pub fn new(store: Arc<dyn SessionStore>, config: ApiConfig) -> Self {
		Self::with_transport(store, config, ReqwestTransport::default())
	}
}
impl<T> Clone for Gateway<T>
where
	T: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			store: self.store.clone(),
			config: self.config.clone(),
			refresh_metrics: self.refresh_metrics.clone(),
			refresh_guard: self.refresh_guard.clone(),
		}
	}
}
impl<T> Debug for Gateway<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Gateway")
			.field("base_url", &self.config.base_url.as_str())
			.field("coalesces_refresh", &self.coalesces_refresh())
			.finish()
	}
}
