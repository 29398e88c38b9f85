// Domain layer: canonical menu schema, static catalogs and ports.

pub mod canteen;
pub mod label;
pub mod model;
pub mod ports;
