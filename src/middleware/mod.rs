mod guard;

pub use guard::{RouteGuard, Guarded, LOADING_PLACEHOLDER};
