//! Page transitions and dashboard panel actions.
//!
//! The presentation layer turns user input into [`Action`]s and renders
//! [`SessionState`] plus the returned [`Outcome`]; all state changes happen here.

use crate::core::generation::GenerationClient;
use crate::core::message::{chat_prompt, ChatMessage};
use crate::core::profile::{ProfileForm, ProfileSettings, UserProfile};
use crate::core::records::{ExportedReport, GenerationRecord, RestorationForm};
use crate::core::session::{HistoryIndexError, Page, SessionState};
use chrono::Local;
use std::error::Error;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Panel {
    #[default]
    Workspace,
    Chatbot,
    Guide,
    History,
    Settings,
    Ethics,
}

impl Panel {
    pub const ALL: [Panel; 6] = [
        Panel::Workspace,
        Panel::Chatbot,
        Panel::Guide,
        Panel::History,
        Panel::Settings,
        Panel::Ethics,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Panel::Workspace => "workspace",
            Panel::Chatbot => "chatbot",
            Panel::Guide => "guide",
            Panel::History => "history",
            Panel::Settings => "settings",
            Panel::Ethics => "ethics",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Panel::Workspace => "Restoration Workspace",
            Panel::Chatbot => "AI Chatbot",
            Panel::Guide => "Art Guide",
            Panel::History => "Saved History",
            Panel::Settings => "Settings",
            Panel::Ethics => "Ethics & About",
        }
    }
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Panel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        Panel::ALL
            .into_iter()
            .find(|panel| panel.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| {
                let names: Vec<&str> = Panel::ALL.iter().map(|panel| panel.as_str()).collect();
                format!("Unknown panel: {value} (choose {})", names.join(", "))
            })
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    GetStarted,
    CreateProfile(ProfileForm),
    Back,
    Logout,
    SelectPanel(Panel),
    Generate(RestorationForm),
    SaveCurrent,
    Export,
    Chat(String),
    DeleteHistory(usize),
    UpdateSettings(ProfileSettings),
}

impl Action {
    fn name(&self) -> &'static str {
        match self {
            Action::GetStarted => "get started",
            Action::CreateProfile(_) => "create profile",
            Action::Back => "back",
            Action::Logout => "logout",
            Action::SelectPanel(_) => "select panel",
            Action::Generate(_) => "generate",
            Action::SaveCurrent => "save",
            Action::Export => "export",
            Action::Chat(_) => "chat",
            Action::DeleteHistory(_) => "delete",
            Action::UpdateSettings(_) => "save settings",
        }
    }

    /// Page the action is valid on.
    fn page(&self) -> Page {
        match self {
            Action::GetStarted => Page::Welcome,
            Action::CreateProfile(_) | Action::Back => Page::Login,
            _ => Page::Dashboard,
        }
    }

    /// Dashboard panel the action belongs to, if it is panel-specific.
    fn panel(&self) -> Option<Panel> {
        match self {
            Action::Generate(_) | Action::SaveCurrent | Action::Export => Some(Panel::Workspace),
            Action::Chat(_) => Some(Panel::Chatbot),
            Action::DeleteHistory(_) => Some(Panel::History),
            Action::UpdateSettings(_) => Some(Panel::Settings),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    PageChanged(Page),
    PanelChanged(Panel),
    Generated(GenerationRecord),
    Saved { saved: usize },
    Exported(ExportedReport),
    ChatReply(String),
    Deleted(GenerationRecord),
    SettingsSaved,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// Required form fields were missing; nothing was sent anywhere.
    Validation(String),
    WrongPage {
        action: &'static str,
        page: Page,
    },
    WrongPanel {
        action: &'static str,
        panel: Panel,
    },
    /// The dashboard was reached without a profile.
    NoProfile,
    NothingToSave,
    NothingToExport,
    IndexOutOfRange(HistoryIndexError),
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::Validation(message) => f.write_str(message),
            RouteError::WrongPage { action, page } => {
                write!(f, "'{action}' is not available on the {page} page")
            }
            RouteError::WrongPanel { action, panel } => {
                write!(f, "'{action}' is not available in the {panel} panel")
            }
            RouteError::NoProfile => f.write_str("No profile; please log in first"),
            RouteError::NothingToSave => {
                f.write_str("Nothing to save yet. Fill the form and generate guidance")
            }
            RouteError::NothingToExport => {
                f.write_str("Nothing to export yet. Fill the form and generate guidance")
            }
            RouteError::IndexOutOfRange(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RouteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RouteError::IndexOutOfRange(err) => Some(err),
            _ => None,
        }
    }
}

/// Applies actions to a session. Owns the generation client and the dashboard
/// menu selection, which is not part of the session's page state.
pub struct ViewRouter {
    generator: GenerationClient,
    panel: Panel,
}

impl ViewRouter {
    pub fn new(generator: GenerationClient) -> Self {
        Self {
            generator,
            panel: Panel::default(),
        }
    }

    pub fn panel(&self) -> Panel {
        self.panel
    }

    pub fn generator(&self) -> &GenerationClient {
        &self.generator
    }

    pub async fn dispatch(
        &mut self,
        session: &mut SessionState,
        action: Action,
    ) -> Result<Outcome, RouteError> {
        let required_page = action.page();
        if session.page != required_page {
            return Err(RouteError::WrongPage {
                action: action.name(),
                page: session.page,
            });
        }
        if let Some(panel) = action.panel() {
            if panel != self.panel {
                return Err(RouteError::WrongPanel {
                    action: action.name(),
                    panel: self.panel,
                });
            }
        }
        debug!(
            action = action.name(),
            page = %session.page,
            panel = %self.panel,
            "Dispatching action"
        );

        match action {
            Action::GetStarted => Ok(Self::go_to(session, Page::Login)),
            Action::Back => Ok(Self::go_to(session, Page::Welcome)),
            Action::CreateProfile(form) => {
                let profile = form.into_profile().map_err(RouteError::Validation)?;
                info!(experience = %profile.experience, tone = %profile.tone, "Profile created");
                session.profile = Some(profile);
                self.panel = Panel::default();
                Ok(Self::go_to(session, Page::Dashboard))
            }
            Action::Logout => {
                session.logout();
                Ok(Outcome::PageChanged(Page::Welcome))
            }
            Action::SelectPanel(panel) => {
                let profile = Self::profile(session)?;
                if panel == Panel::Chatbot {
                    let name = profile.name.clone();
                    session.seed_chat(&name);
                }
                self.panel = panel;
                Ok(Outcome::PanelChanged(panel))
            }
            Action::Generate(form) => {
                let profile = Self::profile(session)?.clone();
                let request = form.validate().map_err(RouteError::Validation)?;
                let response = self
                    .generator
                    .generate(&request.prompt_body(), &profile)
                    .await;
                let record = request.into_record(response, Local::now());
                session.current_output = Some(record.clone());
                Ok(Outcome::Generated(record))
            }
            Action::SaveCurrent => {
                Self::profile(session)?;
                if session.save_current() {
                    Ok(Outcome::Saved {
                        saved: session.history().len(),
                    })
                } else {
                    Err(RouteError::NothingToSave)
                }
            }
            Action::Export => {
                Self::profile(session)?;
                let record = session
                    .current_output
                    .as_ref()
                    .ok_or(RouteError::NothingToExport)?;
                Ok(Outcome::Exported(ExportedReport::build(record, Local::now())))
            }
            Action::Chat(question) => {
                let profile = Self::profile(session)?.clone();
                if question.trim().is_empty() {
                    return Err(RouteError::Validation(
                        "Please enter a question".to_string(),
                    ));
                }
                session.seed_chat(&profile.name);
                let prompt = chat_prompt(&question);
                session.push_chat(ChatMessage::user(question));
                let reply = self.generator.generate(&prompt, &profile).await;
                session.push_chat(ChatMessage::assistant(reply.clone()));
                Ok(Outcome::ChatReply(reply))
            }
            Action::DeleteHistory(index_from_newest) => {
                Self::profile(session)?;
                session
                    .delete_history(index_from_newest)
                    .map(Outcome::Deleted)
                    .map_err(RouteError::IndexOutOfRange)
            }
            Action::UpdateSettings(settings) => {
                let profile = session.profile.as_mut().ok_or(RouteError::NoProfile)?;
                profile.apply_settings(settings);
                Ok(Outcome::SettingsSaved)
            }
        }
    }

    fn go_to(session: &mut SessionState, page: Page) -> Outcome {
        session.page = page;
        Outcome::PageChanged(page)
    }

    fn profile(session: &SessionState) -> Result<&UserProfile, RouteError> {
        session.profile.as_ref().ok_or(RouteError::NoProfile)
    }
}
