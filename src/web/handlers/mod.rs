// HTTP handlers, one module per resource.

pub mod categories;
pub mod model;
pub mod predict;
