pub mod blocked_date;
pub mod calendar;
pub mod feed;
pub mod property;
pub mod tariff;
