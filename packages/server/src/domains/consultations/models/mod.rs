pub mod consultation_payment;

pub use consultation_payment::ConsultationPayment;
