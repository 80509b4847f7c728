//! Collaborators outside the request path: the model artifact and the
//! client used by presentation layers.

pub mod artifact {
    pub use crate::artifact::*;
}

pub mod client {
    pub use crate::client::*;
}
