// Domain layer: wire models and ports (interfaces). No HTTP or filesystem access here.

pub mod model;
pub mod ports;
