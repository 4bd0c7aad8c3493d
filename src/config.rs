#[cfg(debug_assertions)]
pub fn get_document_db_url() -> &'static str {
    "http://localhost:8080/v1"  // Local emulator
}

#[cfg(not(debug_assertions))]
pub fn get_document_db_url() -> &'static str {
    "https://firestore.googleapis.com/v1"
}

pub fn get_document_project() -> &'static str {
    option_env!("BROCHURE_DB_PROJECT").unwrap_or("brochure-site")
}

pub fn get_document_api_key() -> &'static str {
    option_env!("BROCHURE_DB_API_KEY").unwrap_or("")
}

pub fn get_sheet_url() -> &'static str {
    option_env!("BROCHURE_SHEET_URL").unwrap_or("/api/sheet")
}

pub struct EmailSettings {
    pub service_id: &'static str,
    pub template_id: &'static str,
    pub public_key: &'static str,
    /// Inbox that hears about new subscribers.
    pub notify_address: &'static str,
}

pub fn get_email_settings() -> EmailSettings {
    EmailSettings {
        service_id: option_env!("BROCHURE_EMAIL_SERVICE").unwrap_or("default_service"),
        template_id: option_env!("BROCHURE_EMAIL_TEMPLATE").unwrap_or("newsletter_signup"),
        public_key: option_env!("BROCHURE_EMAIL_PUBLIC_KEY").unwrap_or(""),
        notify_address: option_env!("BROCHURE_NOTIFY_ADDRESS").unwrap_or("contact@localhost"),
    }
}
