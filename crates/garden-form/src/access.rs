//! Decides which part of the application a session may see.
//!
//! Only two derived facts are read from the session: its role claim and its
//! application status. Authentication itself happens elsewhere.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    #[default]
    Member,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ApplicationProfile {
    #[serde(default)]
    pub has_applied: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ApplicationStatus>,
}

/// Claims exposed by the hosted auth service for a signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub application: ApplicationProfile,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Landing,
    Application,
    Confirmation,
    Calendar,
    MyBookings,
    Admin,
    Payment,
}

impl Page {
    pub fn path(&self) -> &'static str {
        match self {
            Page::Landing => "/",
            Page::Application => "/retro2",
            Page::Confirmation => "/confirmation",
            Page::Calendar => "/",
            Page::MyBookings => "/my-bookings",
            Page::Admin => "/admin",
            Page::Payment => "/payment",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Page::Landing => "Landing",
            Page::Application => "Application",
            Page::Confirmation => "Confirmation",
            Page::Calendar => "Calendar",
            Page::MyBookings => "My Bookings",
            Page::Admin => "Admin",
            Page::Payment => "Payment",
        }
    }
}

/// The top-level view for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppView {
    /// Signed out: landing page and the public application form.
    Public,
    /// Signed in without an application on file.
    Apply,
    /// Applied, but not approved (pending, rejected or unknown).
    Pending(Option<ApplicationStatus>),
    /// Full booking app. `admin` unlocks the admin panel.
    Member { admin: bool },
}

impl AppView {
    pub fn pages(&self) -> Vec<Page> {
        match self {
            AppView::Public => vec![Page::Landing, Page::Application, Page::Confirmation],
            AppView::Apply => vec![Page::Application],
            AppView::Pending(_) => Vec::new(),
            AppView::Member { admin } => {
                let mut pages = vec![Page::Calendar, Page::MyBookings];
                if *admin {
                    pages.push(Page::Admin);
                }
                pages.extend([Page::Payment, Page::Confirmation, Page::Application]);
                pages
            }
        }
    }

    /// Navigation entries shown in the member header.
    pub fn nav(&self) -> Vec<Page> {
        self.pages()
            .into_iter()
            .filter(|page| matches!(page, Page::Calendar | Page::MyBookings | Page::Admin))
            .collect()
    }

    /// Resolves a URL path to a page this view may show.
    pub fn route(&self, path: &str) -> Option<Page> {
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };
        self.pages().into_iter().find(|page| page.path() == path)
    }
}

pub fn resolve_view(session: Option<&Session>) -> AppView {
    let Some(session) = session else {
        return AppView::Public;
    };
    if session.is_admin() {
        return AppView::Member { admin: true };
    }
    match session.application.status {
        Some(ApplicationStatus::Approved) => AppView::Member { admin: false },
        _ if !session.application.has_applied => AppView::Apply,
        status => AppView::Pending(status),
    }
}
