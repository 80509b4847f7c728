// Domain-layer modules and shared errors/models
pub mod features {
    pub use crate::features::*;
}

pub mod pipeline {
    pub use crate::pipeline::*;
}

pub mod risk {
    pub use crate::risk::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod errors {
    pub use crate::errors::*;
}
