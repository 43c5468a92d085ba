pub mod assignment;
pub mod availability;
pub mod pharmacist;
pub mod rota;
pub mod time_slot;
