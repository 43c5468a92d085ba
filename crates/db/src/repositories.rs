pub mod pharmacist;
pub mod reference;
pub mod rota;
