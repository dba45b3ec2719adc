//! Line-based interactive shell.
//!
//! Each page is printed as plain text; slash commands become router actions.
//! On the chatbot panel any other line is sent as a question.

use crate::core::generation::ApiStatus;
use crate::core::guide::{render_sections, ART_GUIDE, ETHICS};
use crate::core::message::ChatRole;
use crate::core::profile::{Age, ExperienceLevel, Level, ProfileForm, ProfileSettings, Tone};
use crate::core::records::{ArtworkType, GenerationRecord, OutputType, RestorationForm};
use crate::core::router::{Action, Outcome, Panel, ViewRouter};
use crate::core::session::{Page, SessionState};
use std::fmt::Display;
use std::io::{self, Write};
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

enum Flow {
    Continue,
    Quit,
}

pub struct Shell<R, W> {
    input: R,
    out: W,
    router: ViewRouter,
    session: SessionState,
    export_dir: PathBuf,
}

impl<R, W> Shell<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(input: R, out: W, router: ViewRouter, export_dir: PathBuf) -> Self {
        Self {
            input,
            out,
            router,
            session: SessionState::new(),
            export_dir,
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Run until `/quit` or end of input.
    pub async fn run(&mut self) -> io::Result<()> {
        self.render_page()?;
        loop {
            let label = self.prompt_label();
            let Some(line) = self.read_line(&label).await? else {
                break;
            };
            if let Flow::Quit = self.handle_line(line.trim()).await? {
                break;
            }
        }
        writeln!(self.out, "Goodbye!")?;
        Ok(())
    }

    fn prompt_label(&self) -> String {
        match self.session.page {
            Page::Dashboard => format!("[{}]> ", self.router.panel()),
            page => format!("[{page}]> "),
        }
    }

    async fn read_line(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.out, "{label}")?;
        self.out.flush()?;
        let mut buffer = String::new();
        if self.input.read_line(&mut buffer).await? == 0 {
            return Ok(None);
        }
        let line = buffer.trim_end_matches(['\r', '\n']).to_string();
        Ok(Some(line))
    }

    async fn handle_line(&mut self, line: &str) -> io::Result<Flow> {
        if line.is_empty() {
            return Ok(Flow::Continue);
        }
        let (command, argument) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command {
            "/quit" | "/exit" => return Ok(Flow::Quit),
            "/help" => {
                self.print_lines(&help_lines(self.session.page, self.router.panel()))?;
                return Ok(Flow::Continue);
            }
            "/status" => {
                self.print_lines(&self.router.generator().status().lines())?;
                return Ok(Flow::Continue);
            }
            _ => {}
        }

        match self.session.page {
            Page::Welcome => match command {
                "/start" => self.apply(Action::GetStarted).await?,
                _ => self.unknown(line)?,
            },
            Page::Login => match command {
                "/create" => match self.profile_form().await? {
                    Some(form) => self.apply(Action::CreateProfile(form)).await?,
                    None => return Ok(Flow::Quit),
                },
                "/back" => self.apply(Action::Back).await?,
                _ => self.unknown(line)?,
            },
            Page::Dashboard => return self.handle_dashboard(line, command, argument).await,
        }
        Ok(Flow::Continue)
    }

    async fn handle_dashboard(
        &mut self,
        line: &str,
        command: &str,
        argument: &str,
    ) -> io::Result<Flow> {
        if let Some(panel) = command
            .strip_prefix('/')
            .and_then(|name| name.parse::<Panel>().ok())
        {
            self.apply(Action::SelectPanel(panel)).await?;
            return Ok(Flow::Continue);
        }

        match command {
            "/logout" => self.apply(Action::Logout).await?,
            "/generate" => match self.restoration_form().await? {
                Some(form) => self.apply(Action::Generate(form)).await?,
                None => return Ok(Flow::Quit),
            },
            "/save" => self.apply(Action::SaveCurrent).await?,
            "/export" => self.apply(Action::Export).await?,
            "/show" => self.render_panel()?,
            "/delete" => match argument.parse::<usize>() {
                Ok(number) if number >= 1 => self.apply(Action::DeleteHistory(number - 1)).await?,
                _ => writeln!(self.out, "❌ Usage: /delete <number from the list>")?,
            },
            "/edit" => match self.settings_form().await? {
                Some(Some(settings)) => self.apply(Action::UpdateSettings(settings)).await?,
                Some(None) => writeln!(self.out, "❌ No profile; please log in first")?,
                None => return Ok(Flow::Quit),
            },
            _ if !line.starts_with('/') && self.router.panel() == Panel::Chatbot => {
                self.apply(Action::Chat(line.to_string())).await?
            }
            _ => self.unknown(line)?,
        }
        Ok(Flow::Continue)
    }

    fn unknown(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.out, "Unknown command: {line} (type /help)")
    }

    async fn apply(&mut self, action: Action) -> io::Result<()> {
        let outcome = match self.router.dispatch(&mut self.session, action).await {
            Ok(outcome) => outcome,
            Err(err) => {
                debug!(error = %err, "Action rejected");
                return writeln!(self.out, "❌ {err}");
            }
        };

        match outcome {
            Outcome::PageChanged(_) => self.render_page(),
            Outcome::PanelChanged(_) => self.render_panel(),
            Outcome::Generated(record) => self.print_lines(&render_output(&record)),
            Outcome::Saved { .. } => writeln!(self.out, "✅ Saved!"),
            Outcome::Exported(report) => match report.write_to(&self.export_dir) {
                Ok(path) => writeln!(self.out, "📥 Exported to {}", path.display()),
                Err(err) => writeln!(self.out, "❌ Export failed: {err}"),
            },
            Outcome::ChatReply(reply) => writeln!(self.out, "AI: {reply}"),
            Outcome::Deleted(record) => {
                writeln!(self.out, "🗑️ Deleted {}", record.title())?;
                self.render_panel()
            }
            Outcome::SettingsSaved => writeln!(self.out, "✅ Settings saved!"),
        }
    }

    fn render_page(&mut self) -> io::Result<()> {
        let lines = match self.session.page {
            Page::Welcome => render_welcome(&self.router.generator().status()),
            Page::Login => render_login(),
            Page::Dashboard => {
                let mut lines = render_dashboard_header(&self.session);
                lines.push(String::new());
                lines.extend(render_panel(self.router.panel(), &self.session));
                lines
            }
        };
        self.print_lines(&lines)
    }

    fn render_panel(&mut self) -> io::Result<()> {
        let lines = render_panel(self.router.panel(), &self.session);
        self.print_lines(&lines)
    }

    fn print_lines(&mut self, lines: &[String]) -> io::Result<()> {
        for line in lines {
            writeln!(self.out, "{line}")?;
        }
        Ok(())
    }

    async fn prompt_text(&mut self, label: &str) -> io::Result<Option<String>> {
        self.read_line(&format!("{label}: ")).await
    }

    /// Ask until the answer parses; a blank answer keeps `default`.
    async fn prompt_with_default<T, F>(
        &mut self,
        label: &str,
        default: T,
        parse: F,
    ) -> io::Result<Option<T>>
    where
        T: Display,
        F: Fn(&str) -> Result<T, String>,
    {
        loop {
            let Some(answer) = self.read_line(&format!("{label} [{default}]: ")).await? else {
                return Ok(None);
            };
            let answer = answer.trim();
            if answer.is_empty() {
                return Ok(Some(default));
            }
            match parse(answer) {
                Ok(value) => return Ok(Some(value)),
                Err(err) => writeln!(self.out, "❌ {err}")?,
            }
        }
    }

    /// Ask for one of `choices`; blank leaves it unset.
    async fn prompt_choice<T>(
        &mut self,
        label: &str,
        choices: &[T],
    ) -> io::Result<Option<Option<T>>>
    where
        T: Display + std::str::FromStr<Err = String>,
    {
        let listed: Vec<String> = choices
            .iter()
            .enumerate()
            .map(|(index, choice)| format!("{}) {choice}", index + 1))
            .collect();
        writeln!(self.out, "{label}: {}", listed.join("  "))?;
        loop {
            let Some(answer) = self.read_line(&format!("{label}: ")).await? else {
                return Ok(None);
            };
            let answer = answer.trim();
            if answer.is_empty() {
                return Ok(Some(None));
            }
            match answer.parse::<T>() {
                Ok(value) => return Ok(Some(Some(value))),
                Err(err) => writeln!(self.out, "❌ {err}")?,
            }
        }
    }

    async fn profile_form(&mut self) -> io::Result<Option<ProfileForm>> {
        let defaults = ProfileForm::default();
        let Some(name) = self.prompt_text("Full Name").await? else {
            return Ok(None);
        };
        let Some(email) = self.prompt_text("Email").await? else {
            return Ok(None);
        };
        let Some(password) = self.prompt_text("Password").await? else {
            return Ok(None);
        };
        let Some(age) = self.prompt_with_default("Age", defaults.age, parse_age).await? else {
            return Ok(None);
        };
        let Some(experience) = self
            .prompt_with_default("Experience", defaults.experience, |s| {
                s.parse::<ExperienceLevel>()
            })
            .await?
        else {
            return Ok(None);
        };
        let Some(creativity) = self
            .prompt_with_default("Creativity Level", defaults.creativity, parse_level)
            .await?
        else {
            return Ok(None);
        };
        let Some(length) = self
            .prompt_with_default("Output Length", defaults.length, parse_level)
            .await?
        else {
            return Ok(None);
        };
        let Some(tone) = self
            .prompt_with_default("Tone", defaults.tone, |s| s.parse::<Tone>())
            .await?
        else {
            return Ok(None);
        };
        Ok(Some(ProfileForm {
            name,
            email,
            password,
            age,
            experience,
            creativity,
            length,
            tone,
        }))
    }

    /// `Some(None)` when there is no profile to edit; `None` on end of input.
    async fn settings_form(&mut self) -> io::Result<Option<Option<ProfileSettings>>> {
        let Some(current) = self.session.profile.as_ref().map(|p| p.settings()) else {
            return Ok(Some(None));
        };
        let Some(name) = self
            .prompt_with_default("Name", current.name.clone(), |s| Ok(s.to_string()))
            .await?
        else {
            return Ok(None);
        };
        let Some(age) = self.prompt_with_default("Age", current.age, parse_age).await? else {
            return Ok(None);
        };
        let Some(experience) = self
            .prompt_with_default("Experience", current.experience, |s| {
                s.parse::<ExperienceLevel>()
            })
            .await?
        else {
            return Ok(None);
        };
        let Some(creativity) = self
            .prompt_with_default("Creativity", current.creativity, parse_level)
            .await?
        else {
            return Ok(None);
        };
        let Some(length) = self
            .prompt_with_default("Output Length", current.length, parse_level)
            .await?
        else {
            return Ok(None);
        };
        let Some(tone) = self
            .prompt_with_default("Tone", current.tone, |s| s.parse::<Tone>())
            .await?
        else {
            return Ok(None);
        };
        Ok(Some(Some(ProfileSettings {
            name,
            age,
            experience,
            creativity,
            length,
            tone,
        })))
    }

    async fn restoration_form(&mut self) -> io::Result<Option<RestorationForm>> {
        let Some(artwork_type) = self
            .prompt_choice("Artwork Type", &ArtworkType::ALL)
            .await?
        else {
            return Ok(None);
        };
        let Some(period) = self.prompt_text("Art Period/Style").await? else {
            return Ok(None);
        };
        let Some(artist) = self.prompt_text("Artist Name (Optional)").await? else {
            return Ok(None);
        };
        let Some(region) = self.prompt_text("Cultural Region (Optional)").await? else {
            return Ok(None);
        };
        let Some(damage) = self.prompt_text("Damage Description").await? else {
            return Ok(None);
        };
        let Some(output_type) = self.prompt_choice("Output Type", &OutputType::ALL).await? else {
            return Ok(None);
        };
        writeln!(self.out, "Generating...")?;
        self.out.flush()?;
        Ok(Some(RestorationForm {
            artwork_type,
            period,
            artist,
            region,
            damage,
            output_type,
        }))
    }
}

fn parse_age(value: &str) -> Result<Age, String> {
    let number: u32 = value
        .parse()
        .map_err(|_| format!("Age must be a whole number between {} and {}", Age::MIN, Age::MAX))?;
    Age::try_from(number)
}

fn parse_level(value: &str) -> Result<Level, String> {
    let number: u32 = value.parse().map_err(|_| {
        format!(
            "Level must be a whole number between {} and {}",
            Level::MIN,
            Level::MAX
        )
    })?;
    Level::try_from(number)
}

pub fn render_welcome(status: &ApiStatus) -> Vec<String> {
    let mut lines = vec![
        "🎨 ArtRestorer AI".to_string(),
        "Reviving Cultural Heritage Through Ethical Generative AI".to_string(),
        RULE.to_string(),
        "Many historical artworks are damaged or partially lost. This application provides \
AI-assisted, text-based restoration guidance for museums, students, and cultural researchers."
            .to_string(),
        String::new(),
    ];
    lines.extend(status.lines());
    lines.push(String::new());
    lines.push(
        "📜 Text-Based Guidance   🎨 Cultural Interpretation   ✨ Ethical AI Principles   🏛️ Museum-Quality Insights"
            .to_string(),
    );
    lines.push(String::new());
    lines.push("Type /start to log in or get started, /help for commands.".to_string());
    lines
}

fn render_login() -> Vec<String> {
    vec![
        "Create Your Profile".to_string(),
        RULE.to_string(),
        "Type /create to fill in your profile, or /back to return.".to_string(),
    ]
}

fn render_dashboard_header(session: &SessionState) -> Vec<String> {
    let mut lines = vec!["🎨 ArtRestorer AI".to_string()];
    if let Some(profile) = &session.profile {
        lines.push(format!("{} <{}>", profile.name, profile.email));
    }
    let menu: Vec<String> = Panel::ALL.iter().map(|panel| format!("/{panel}")).collect();
    lines.push(format!("Menu: {}   /logout", menu.join("  ")));
    lines
}

fn render_output(record: &GenerationRecord) -> Vec<String> {
    let mut lines = vec![
        "AI-Generated Guidance".to_string(),
        format!("Time: {}", record.created_at.format("%Y-%m-%d %H:%M")),
        RULE.to_string(),
    ];
    lines.extend(record.response.lines().map(str::to_string));
    lines.push(RULE.to_string());
    lines.push("/save to keep it in history, /export to write a report.".to_string());
    lines
}

/// Text for one dashboard panel.
pub fn render_panel(panel: Panel, session: &SessionState) -> Vec<String> {
    let mut lines = vec![panel.title().to_string(), RULE.to_string()];
    match panel {
        Panel::Workspace => match &session.current_output {
            Some(record) => lines.extend(render_output(record)),
            None => {
                lines.push("Fill the form and generate guidance".to_string());
                lines.push("Type /generate to start.".to_string());
            }
        },
        Panel::Chatbot => {
            for message in session.chat() {
                let speaker = match message.role {
                    ChatRole::User => "You",
                    ChatRole::Assistant => "AI",
                };
                lines.push(format!("{speaker}: {}", message.content));
            }
            lines.push("Ask about art restoration...".to_string());
        }
        Panel::Guide => lines.extend(render_sections(ART_GUIDE)),
        Panel::History => {
            let summary = session.history_summary();
            lines.push(format!(
                "Saved Records: {}   Chat Messages: {}   Total: {}",
                summary.saved_records,
                summary.chat_messages,
                summary.total()
            ));
            lines.push(String::new());
            if session.history().is_empty() {
                lines.push("No saved records yet".to_string());
            } else {
                for (index, record) in session.history_newest_first().enumerate() {
                    lines.push(format!("{}. {}", index + 1, record.title()));
                    lines.push(format!("   Period: {}", record.period));
                    lines.push(format!("   Damage: {}", record.damage_preview()));
                }
                lines.push("Type /delete <number> to remove a record.".to_string());
            }
        }
        Panel::Settings => match &session.profile {
            Some(profile) => {
                lines.push(format!("Name: {}", profile.name));
                lines.push(format!("Email: {}", profile.email));
                lines.push(format!("Age: {}", profile.age));
                lines.push(format!("Experience: {}", profile.experience));
                lines.push(format!("Creativity: {}/10", profile.creativity));
                lines.push(format!("Output Length: {}/10", profile.length));
                lines.push(format!("Tone: {}", profile.tone));
                lines.push("Type /edit to change your settings.".to_string());
            }
            None => lines.push("No profile".to_string()),
        },
        Panel::Ethics => lines.extend(render_sections(ETHICS)),
    }
    lines
}

fn help_lines(page: Page, panel: Panel) -> Vec<String> {
    let mut lines = vec!["Commands:".to_string()];
    match page {
        Page::Welcome => lines.push("  /start      Log in / get started".to_string()),
        Page::Login => {
            lines.push("  /create     Fill in and create your profile".to_string());
            lines.push("  /back       Return to the welcome page".to_string());
        }
        Page::Dashboard => {
            for panel in Panel::ALL {
                lines.push(format!("  /{:<10} Open {}", panel.as_str(), panel.title()));
            }
            lines.push("  /logout     Log out".to_string());
            let panel_commands: &[&str] = match panel {
                Panel::Workspace => &[
                    "  /generate   Describe an artwork and generate guidance",
                    "  /save       Save the current guidance to history",
                    "  /export     Write the current guidance to a report file",
                    "  /show       Show the current guidance again",
                ],
                Panel::Chatbot => &["  <text>      Ask the assistant a question"],
                Panel::History => &["  /delete N   Delete record N from the list"],
                Panel::Settings => &["  /edit       Edit your profile settings"],
                Panel::Guide | Panel::Ethics => &[],
            };
            lines.extend(panel_commands.iter().map(|line| line.to_string()));
        }
    }
    lines.push("  /status     Show API configuration status".to_string());
    lines.push("  /help       Show this help".to_string());
    lines.push("  /quit       Exit".to_string());
    lines
}
