mod forms;
mod middleware;
mod public;
mod relay;

pub use public::{HttpState, build_router};
