//! Single-request commands that skip the interactive shell.

use std::error::Error;
use std::path::Path;

use clap::Args as ClapArgs;

use crate::core::generation::GenerationClient;
use crate::core::profile::{ExperienceLevel, Level, ProfileForm, Tone};
use crate::core::records::{ArtworkType, OutputType, RestorationForm};
use crate::core::router::{Action, Outcome, Panel, ViewRouter};
use crate::core::session::SessionState;

/// Profile values that condition the answer.
#[derive(ClapArgs, Debug, Clone)]
pub struct ProfileArgs {
    /// Name used in the conversation
    #[arg(long, default_value = "Guest")]
    pub name: String,

    /// Experience level (beginner, intermediate, advanced)
    #[arg(long, default_value_t = ExperienceLevel::Intermediate)]
    pub experience: ExperienceLevel,

    /// Tone of the answer (academic, simplified)
    #[arg(long, default_value_t = Tone::Academic)]
    pub tone: Tone,

    /// Creativity level, 1 to 10
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u8).range(1..=10))]
    pub creativity: u8,

    /// Output length, 1 to 10
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u8).range(1..=10))]
    pub length: u8,
}

impl ProfileArgs {
    fn into_form(self) -> Result<ProfileForm, String> {
        Ok(ProfileForm {
            name: self.name,
            email: "guest@localhost".to_string(),
            experience: self.experience,
            tone: self.tone,
            creativity: Level::try_from(u32::from(self.creativity))?,
            length: Level::try_from(u32::from(self.length))?,
            ..ProfileForm::default()
        })
    }
}

#[derive(ClapArgs, Debug, Clone)]
pub struct GenerateArgs {
    /// Artwork type (Painting, Sculpture, Manuscript, Textile, Mural)
    #[arg(long)]
    pub artwork: ArtworkType,

    /// Art period or style
    #[arg(long, default_value = "")]
    pub period: String,

    /// Artist name
    #[arg(long, default_value = "")]
    pub artist: String,

    /// Cultural region
    #[arg(long, default_value = "")]
    pub region: String,

    /// Description of the damage
    #[arg(long)]
    pub damage: String,

    /// Output type, e.g. "Conservation Advice" or its number 1-5
    #[arg(long = "output")]
    pub output_type: OutputType,

    /// Also write the report to the export directory
    #[arg(long)]
    pub export: bool,

    #[command(flatten)]
    pub profile: ProfileArgs,
}

/// A router and session already on the dashboard with `profile` logged in.
async fn logged_in(
    generator: GenerationClient,
    profile: ProfileArgs,
) -> Result<(ViewRouter, SessionState), Box<dyn Error>> {
    let mut router = ViewRouter::new(generator);
    let mut session = SessionState::new();
    router.dispatch(&mut session, Action::GetStarted).await?;
    router
        .dispatch(&mut session, Action::CreateProfile(profile.into_form()?))
        .await?;
    Ok((router, session))
}

pub async fn run_generate(
    generator: GenerationClient,
    args: GenerateArgs,
    export_dir: &Path,
) -> Result<(), Box<dyn Error>> {
    let (mut router, mut session) = logged_in(generator, args.profile).await?;
    let form = RestorationForm {
        artwork_type: Some(args.artwork),
        period: args.period,
        artist: args.artist,
        region: args.region,
        damage: args.damage,
        output_type: Some(args.output_type),
    };

    if let Outcome::Generated(record) = router
        .dispatch(&mut session, Action::Generate(form))
        .await?
    {
        println!("{}", record.response);
    }

    if args.export {
        if let Outcome::Exported(report) = router.dispatch(&mut session, Action::Export).await? {
            let path = report.write_to(export_dir)?;
            eprintln!("📥 Exported to {}", path.display());
        }
    }
    Ok(())
}

pub async fn run_ask(
    generator: GenerationClient,
    profile: ProfileArgs,
    question: &str,
) -> Result<(), Box<dyn Error>> {
    let (mut router, mut session) = logged_in(generator, profile).await?;
    router
        .dispatch(&mut session, Action::SelectPanel(Panel::Chatbot))
        .await?;
    if let Outcome::ChatReply(reply) = router
        .dispatch(&mut session, Action::Chat(question.to_string()))
        .await?
    {
        println!("{reply}");
    }
    Ok(())
}
