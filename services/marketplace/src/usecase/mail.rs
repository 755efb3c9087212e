//! Email templates. Every interpolated value is HTML-escaped.

use uuid::Uuid;

use croscout_domain::booking::BookingStatus;

use crate::domain::types::MailMessage;

fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn booking_created(owner_email: &str, owner_name: &str, property_name: &str) -> MailMessage {
    MailMessage {
        to: vec![owner_email.to_owned()],
        subject: "New Booking Confirmation".to_owned(),
        html: format!(
            "<b>Hello {},</b><br><p>A new booking has been made for your property <strong>{}</strong>.</p>",
            escape(owner_name),
            escape(property_name),
        ),
    }
}

pub fn booking_status(recipients: Vec<String>, booking_id: Uuid, status: BookingStatus) -> MailMessage {
    MailMessage {
        to: recipients,
        subject: format!("Booking Status Update: {}", status.as_str()),
        html: format!(
            "<b>Hello there,</b><br><p>The booking has been {}. Booking id: {booking_id}</p>",
            status.as_str(),
        ),
    }
}

pub fn payment_details(
    guest_email: &str,
    guest_name: &str,
    booking_id: Uuid,
    agent_paypal_email: &str,
    payment_instruction: &str,
) -> MailMessage {
    MailMessage {
        to: vec![guest_email.to_owned()],
        subject: "Requested to Booking Payment with Details".to_owned(),
        html: format!(
            "<p>Dear {},</p><br>\
             <p>Your booking payment details have been updated. Here are the details for booking ID: <strong>{booking_id}</strong>:</p>\
             <p><strong>Agent PayPal Email:</strong> {}</p>\
             <p><strong>Payment Instruction:</strong> {}</p>\
             <p>Please complete the payment as instructed and submit your transaction ID.</p>\
             <p>Thank you for choosing Croscout.</p>\
             <p>Best regards,<br>The Croscout Team</p>",
            escape(guest_name),
            escape(agent_paypal_email),
            escape(payment_instruction),
        ),
    }
}

pub fn transaction_id_submitted(
    owner_email: &str,
    owner_name: &str,
    booking_id: Uuid,
    user_transaction_id: &str,
) -> MailMessage {
    MailMessage {
        to: vec![owner_email.to_owned()],
        subject: "Transaction ID Submitted".to_owned(),
        html: format!(
            "<p>Hello {},</p><br>\
             <p>The transaction ID for booking ID: <strong>{booking_id}</strong> has been submitted. \
             Here is the transaction ID: <strong>{}</strong>.</p>\
             <p>Please verify the transaction and update the booking status accordingly.</p>",
            escape(owner_name),
            escape(user_transaction_id),
        ),
    }
}

pub fn reset_password(to: &str, client_url: &str, token: &str) -> MailMessage {
    let link = format!("{}/reset-password/{token}", client_url.trim_end_matches('/'));
    MailMessage {
        to: vec![to.to_owned()],
        subject: "Password Reset".to_owned(),
        html: format!(
            "You are receiving this because you have requested the reset of the password for your account.<br/>\
             Please click on the following link, or paste this into your browser to complete the process:<br/>\
             <a href=\"{0}\">Click here to reset your password</a><br/>\
             If you did not request this, please ignore this email and your password will remain unchanged.",
            escape(&link),
        ),
    }
}

pub fn verify_email(to: &str, client_url: &str, token: &str) -> MailMessage {
    let link = format!("{}/verify-email?token={token}", client_url.trim_end_matches('/'));
    MailMessage {
        to: vec![to.to_owned()],
        subject: "Email Verification".to_owned(),
        html: format!(
            "<p>Please verify your email by clicking on the following link:</p><p><a href=\"{0}\">{0}</a></p>",
            escape(&link),
        ),
    }
}
