// Teams: binding of externally supplied teams to resolved seat slots.

pub mod binding;
pub mod handlers;
