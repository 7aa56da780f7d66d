use super::sendmail::send_email;
use crate::config::Config;

// One sender per booking template. Subjects carry the booking number the way
// the operator screens reference them.

pub async fn send_booking_received_email(
    config: &Config,
    to_email: &str,
    username: &str,
    job_id: &str,
    due: &str,
    duration: &str,
) -> Result<(), String> {
    let subject = format!("We have received your interpreter booking #{}", job_id);
    let template_path = "src/mail/templates/booking-received.html";
    let placeholders = vec![
        ("{{username}}".to_string(), username.to_string()),
        ("{{job_id}}".to_string(), job_id.to_string()),
        ("{{due}}".to_string(), due.to_string()),
        ("{{duration}}".to_string(), duration.to_string()),
    ];

    send_email(config, to_email, &subject, template_path, &placeholders).await
}

pub async fn send_booking_reopened_email(
    config: &Config,
    to_email: &str,
    username: &str,
    job_id: &str,
    language: &str,
) -> Result<(), String> {
    let subject = format!(
        "We have reopened your booking of a {} interpreter, booking #{}",
        language, job_id
    );
    let template_path = "src/mail/templates/booking-reopened.html";
    let placeholders = vec![
        ("{{username}}".to_string(), username.to_string()),
        ("{{job_id}}".to_string(), job_id.to_string()),
        ("{{language}}".to_string(), language.to_string()),
    ];

    send_email(config, to_email, &subject, template_path, &placeholders).await
}

pub async fn send_job_accepted_email(
    config: &Config,
    to_email: &str,
    username: &str,
    job_id: &str,
) -> Result<(), String> {
    let subject = format!(
        "Confirmation - an interpreter has accepted your booking (booking #{})",
        job_id
    );
    let template_path = "src/mail/templates/job-accepted.html";
    let placeholders = vec![
        ("{{username}}".to_string(), username.to_string()),
        ("{{job_id}}".to_string(), job_id.to_string()),
    ];

    send_email(config, to_email, &subject, template_path, &placeholders).await
}

pub async fn send_job_accepted_translator_email(
    config: &Config,
    to_email: &str,
    username: &str,
    job_id: &str,
    due: &str,
    duration: &str,
) -> Result<(), String> {
    let subject = format!(
        "Confirmation - an interpreter has accepted your booking (booking #{})",
        job_id
    );
    let template_path = "src/mail/templates/job-accepted-translator.html";
    let placeholders = vec![
        ("{{username}}".to_string(), username.to_string()),
        ("{{job_id}}".to_string(), job_id.to_string()),
        ("{{due}}".to_string(), due.to_string()),
        ("{{duration}}".to_string(), duration.to_string()),
    ];

    send_email(config, to_email, &subject, template_path, &placeholders).await
}

pub async fn send_changed_translator_customer_email(
    config: &Config,
    to_email: &str,
    username: &str,
    job_id: &str,
) -> Result<(), String> {
    let subject = format!("Notice about interpreter assignment for booking #{}", job_id);
    let template_path = "src/mail/templates/changed-translator-customer.html";
    let placeholders = vec![
        ("{{username}}".to_string(), username.to_string()),
        ("{{job_id}}".to_string(), job_id.to_string()),
    ];

    send_email(config, to_email, &subject, template_path, &placeholders).await
}

pub async fn send_changed_translator_old_email(
    config: &Config,
    to_email: &str,
    username: &str,
    job_id: &str,
) -> Result<(), String> {
    let subject = format!("Notice about interpreter assignment for booking #{}", job_id);
    let template_path = "src/mail/templates/changed-translator-old.html";
    let placeholders = vec![
        ("{{username}}".to_string(), username.to_string()),
        ("{{job_id}}".to_string(), job_id.to_string()),
    ];

    send_email(config, to_email, &subject, template_path, &placeholders).await
}

pub async fn send_changed_translator_new_email(
    config: &Config,
    to_email: &str,
    username: &str,
    job_id: &str,
) -> Result<(), String> {
    let subject = format!("Notice about interpreter assignment for booking #{}", job_id);
    let template_path = "src/mail/templates/changed-translator-new.html";
    let placeholders = vec![
        ("{{username}}".to_string(), username.to_string()),
        ("{{job_id}}".to_string(), job_id.to_string()),
    ];

    send_email(config, to_email, &subject, template_path, &placeholders).await
}

pub async fn send_changed_date_email(
    config: &Config,
    to_email: &str,
    username: &str,
    job_id: &str,
    old_time: &str,
    new_time: &str,
) -> Result<(), String> {
    let subject = format!("Notice about a change to booking #{}", job_id);
    let template_path = "src/mail/templates/changed-date.html";
    let placeholders = vec![
        ("{{username}}".to_string(), username.to_string()),
        ("{{job_id}}".to_string(), job_id.to_string()),
        ("{{old_time}}".to_string(), old_time.to_string()),
        ("{{new_time}}".to_string(), new_time.to_string()),
    ];

    send_email(config, to_email, &subject, template_path, &placeholders).await
}

pub async fn send_changed_language_email(
    config: &Config,
    to_email: &str,
    username: &str,
    job_id: &str,
    old_language: &str,
    new_language: &str,
) -> Result<(), String> {
    let subject = format!("Notice about a change to booking #{}", job_id);
    let template_path = "src/mail/templates/changed-lang.html";
    let placeholders = vec![
        ("{{username}}".to_string(), username.to_string()),
        ("{{job_id}}".to_string(), job_id.to_string()),
        ("{{old_language}}".to_string(), old_language.to_string()),
        ("{{new_language}}".to_string(), new_language.to_string()),
    ];

    send_email(config, to_email, &subject, template_path, &placeholders).await
}

/// `for_text` is "invoice" for the customer copy and "salary" for the
/// translator copy.
pub async fn send_session_ended_email(
    config: &Config,
    to_email: &str,
    username: &str,
    job_id: &str,
    session_time: &str,
    for_text: &str,
) -> Result<(), String> {
    let subject = format!(
        "Information about a finished interpretation for booking #{}",
        job_id
    );
    let template_path = "src/mail/templates/session-ended.html";
    let placeholders = vec![
        ("{{username}}".to_string(), username.to_string()),
        ("{{job_id}}".to_string(), job_id.to_string()),
        ("{{session_time}}".to_string(), session_time.to_string()),
        ("{{for_text}}".to_string(), for_text.to_string()),
    ];

    send_email(config, to_email, &subject, template_path, &placeholders).await
}

pub async fn send_booking_cancelled_email(
    config: &Config,
    to_email: &str,
    username: &str,
    job_id: &str,
) -> Result<(), String> {
    let subject = format!("Cancellation of booking #{}", job_id);
    let template_path = "src/mail/templates/booking-cancelled.html";
    let placeholders = vec![
        ("{{username}}".to_string(), username.to_string()),
        ("{{job_id}}".to_string(), job_id.to_string()),
    ];

    send_email(config, to_email, &subject, template_path, &placeholders).await
}

pub async fn send_job_cancelled_translator_email(
    config: &Config,
    to_email: &str,
    username: &str,
    job_id: &str,
) -> Result<(), String> {
    let subject = format!(
        "Information about a finished interpretation for booking #{}",
        job_id
    );
    let template_path = "src/mail/templates/job-cancelled-translator.html";
    let placeholders = vec![
        ("{{username}}".to_string(), username.to_string()),
        ("{{job_id}}".to_string(), job_id.to_string()),
    ];

    send_email(config, to_email, &subject, template_path, &placeholders).await
}
