pub mod mercado_pago;

pub use mercado_pago::MercadoPagoClient;
