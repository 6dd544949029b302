pub mod notification;
pub mod tariff;
