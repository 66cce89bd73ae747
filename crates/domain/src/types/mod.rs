//! Data types exchanged between callers, clients and transports

pub mod request;
pub mod response;
pub mod session;

pub use request::{
    BasicAuth, MultipartForm, MultipartPart, OutgoingRequest, PartContent, RequestBody,
    RequestDescriptor, RequestOptions,
};
pub use response::ResponseEnvelope;
pub use session::UserData;
