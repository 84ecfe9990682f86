//! Display tones for record statuses and priorities, shared by every view.

use strum::{Display, EnumIter, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Caution,
    Progress,
    Success,
    Danger,
    Neutral,
}

impl Tone {
    pub const fn badge_class(self) -> &'static str {
        match self {
            Tone::Info => "bg-blue-100 text-blue-800",
            Tone::Caution => "bg-yellow-100 text-yellow-800",
            Tone::Progress => "bg-purple-100 text-purple-800",
            Tone::Success => "bg-green-100 text-green-800",
            Tone::Danger => "bg-red-100 text-red-800",
            Tone::Neutral => "bg-gray-100 text-gray-800",
        }
    }
}

/// Statuses of customers, employees, invoices and service requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordStatus {
    New,
    Assigned,
    InProgress,
    Completed,
    Cancelled,
    Draft,
    Pending,
    Sent,
    Paid,
    Overdue,
    Active,
    Inactive,
    Blocked,
    OnLeave,
    Terminated,
}

impl RecordStatus {
    pub const fn tone(self) -> Tone {
        match self {
            RecordStatus::New | RecordStatus::Sent => Tone::Info,
            RecordStatus::Assigned | RecordStatus::Pending | RecordStatus::OnLeave => {
                Tone::Caution
            }
            RecordStatus::InProgress => Tone::Progress,
            RecordStatus::Completed | RecordStatus::Paid | RecordStatus::Active => Tone::Success,
            RecordStatus::Overdue | RecordStatus::Blocked | RecordStatus::Terminated => {
                Tone::Danger
            }
            RecordStatus::Cancelled | RecordStatus::Draft | RecordStatus::Inactive => {
                Tone::Neutral
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub const fn text_class(self) -> &'static str {
        match self {
            Priority::Low => "text-gray-600",
            Priority::Medium => "text-yellow-600",
            Priority::High => "text-orange-600",
            Priority::Urgent => "text-red-600",
        }
    }
}

/// Tone for a raw status string as it arrives from the API.
pub fn status_tone(raw: &str) -> Tone {
    raw.parse::<RecordStatus>()
        .map(RecordStatus::tone)
        .unwrap_or(Tone::Neutral)
}

pub fn priority_class(raw: &str) -> &'static str {
    raw.parse::<Priority>()
        .map(Priority::text_class)
        .unwrap_or(Priority::Low.text_class())
}
