// Adapters layer: concrete implementations for external systems (HTTP).

pub mod http;
