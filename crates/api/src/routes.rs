pub mod health;
pub mod rota;
pub mod week;
