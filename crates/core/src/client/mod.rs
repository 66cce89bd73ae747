//! Backend clients, their interceptors and the registry that owns them

pub mod api_client;
pub mod interceptors;
pub mod registry;

pub use api_client::{resolve_url, ApiClient};
pub use interceptors::{
    BearerTokenInterceptor, Interceptor, InterceptorChain, UnauthorizedInterceptor,
};
pub use registry::{ClientRegistry, RegistryDeps};
