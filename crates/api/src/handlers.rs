pub mod reference;
pub mod rota;
pub mod week;
