/// Email templates
use super::mailer::Email;

/// Message carrying a signup verification code
pub fn verification_email(from: &str, to: &str, token: &str) -> Email {
    Email {
        from: from.to_string(),
        to: to.to_string(),
        subject: "Verify Your Email".to_string(),
        html: format!(
            "<p>Hello,</p>\
             <p>Use the code below to verify your email address:</p>\
             <p><strong>{token}</strong></p>\
             <p>The code expires in 7 days. If you didn't sign up, please ignore this email.</p>"
        ),
    }
}

/// Message carrying a password reset code
pub fn password_reset_email(from: &str, to: &str, token: &str) -> Email {
    Email {
        from: from.to_string(),
        to: to.to_string(),
        subject: "Reset Your Password".to_string(),
        html: format!(
            "<p>Hello,</p>\
             <p>Use the code below to reset your password:</p>\
             <p><strong>{token}</strong></p>\
             <p>The code expires in 1 hour. If you didn't request a reset, please ignore this email.</p>"
        ),
    }
}
