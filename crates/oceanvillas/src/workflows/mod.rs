pub mod availability;
pub mod hostaway;
