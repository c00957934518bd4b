//! External integrations: the inbound HTTP dispatch layer and the outbound
//! proxy toward the parent platform.

pub mod http;
pub mod parent_proxy;
