pub mod pay_for_consultation;
pub mod schedule_meeting;

pub use pay_for_consultation::pay_for_consultation;
pub use schedule_meeting::schedule_meeting;
