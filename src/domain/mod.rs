// Domain layer: core models, ports (interfaces) and the assignment services.

pub mod model;
pub mod ports;

pub mod services;
