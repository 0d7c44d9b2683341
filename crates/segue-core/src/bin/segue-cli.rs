use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use segue_core::{
    Engine, OfflineRenderer, PlanRequest, Session, XfadeCurve,
    diagnostics::init_tracing,
    fixtures::demo_session,
    ingest::{load_analysis, save_plan},
    planner::{PlanOptions, TempoStrategy},
    report::write_report,
    scan_track_library,
    schedule::RenderOptions,
};

#[derive(Debug, Parser)]
#[command(name = "segue-cli")]
#[command(about = "Headless tools for transition planning, rendering, and reports")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Plan a transition from two analysis JSON files.
    Plan {
        analysis_a: PathBuf,
        analysis_b: PathBuf,

        #[arg(long, default_value_t = 16)]
        beats: u32,

        #[arg(long, value_enum, default_value = "keep-own")]
        tempo_strategy: TempoStrategyArg,

        #[arg(long)]
        smart_length: bool,

        #[arg(long)]
        phrase_align: bool,

        #[arg(long)]
        harmonic_match: bool,

        #[arg(long, default_value = "data/plans/plan.json")]
        output: PathBuf,
    },
    /// Render the built-in demo session to a WAV plus a report.
    DemoRender {
        #[arg(long, default_value = "data/exports")]
        output_dir: PathBuf,

        #[arg(long, value_enum, default_value = "equal-power")]
        curve: CurveArg,

        #[arg(long, default_value_t = 256)]
        steps: u32,
    },
    /// Recompute the determinism report for the demo session.
    Report {
        #[arg(long, default_value = "data/reports/transition.json")]
        output: PathBuf,
    },
    /// Scan a track library directory for audio with analysis sidecars.
    Scan {
        directory: PathBuf,
    },
}

#[derive(Debug, Clone, ValueEnum)]
enum TempoStrategyArg {
    KeepOwn,
    MatchBToA,
    MatchAToB,
    Average,
}

impl From<TempoStrategyArg> for TempoStrategy {
    fn from(value: TempoStrategyArg) -> Self {
        match value {
            TempoStrategyArg::KeepOwn => Self::KeepOwn,
            TempoStrategyArg::MatchBToA => Self::MatchBToA,
            TempoStrategyArg::MatchAToB => Self::MatchAToB,
            TempoStrategyArg::Average => Self::Average,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
enum CurveArg {
    EqualPower,
    Linear,
    Rise,
    DjS,
}

impl From<CurveArg> for XfadeCurve {
    fn from(value: CurveArg) -> Self {
        match value {
            CurveArg::EqualPower => Self::EqualPower,
            CurveArg::Linear => Self::Linear,
            CurveArg::Rise => Self::Rise,
            CurveArg::DjS => Self::DjS,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _telemetry = init_tracing(&cli.log_dir)?;

    match cli.command {
        Commands::Plan {
            analysis_a,
            analysis_b,
            beats,
            tempo_strategy,
            smart_length,
            phrase_align,
            harmonic_match,
            output,
        } => {
            let session = Session::new(load_analysis(&analysis_a)?, load_analysis(&analysis_b)?);
            let mut engine = Engine::new(session);
            let plan = engine.plan_transition(&PlanRequest {
                beats_length: beats,
                strategy: tempo_strategy.into(),
                options: PlanOptions {
                    smart_length,
                    phrase_align,
                    harmonic_match,
                    ..PlanOptions::default()
                },
            });
            save_plan(&output, &plan)?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        Commands::DemoRender {
            output_dir,
            curve,
            steps,
        } => {
            let mut engine = Engine::new(demo_session());
            engine.plan_transition(&demo_plan_request());

            let mut device = OfflineRenderer::with_output(48_000, 2);
            let options = RenderOptions {
                curve: curve.into(),
                ..RenderOptions::default()
            };
            let report = engine.export_wav(
                &mut device,
                &options,
                steps,
                &output_dir.join("demo-transition.wav"),
            )?;
            write_report(&output_dir.join("demo-transition.report.json"), &report)?;
            tracing::info!(
                automation_hash = %report.automation_hash,
                "demo transition exported"
            );
        }
        Commands::Report { output } => {
            let mut engine = Engine::new(demo_session());
            let plan = engine.plan_transition(&demo_plan_request());
            let session = engine.session();
            let frames = segue_core::schedule::schedule(
                &plan,
                &session.deck_a.analysis,
                &session.deck_b.analysis,
                &RenderOptions::default(),
                256,
            );
            let report = segue_core::report::generate_report(&plan, &frames, None)?;
            write_report(&output, &report)?;
            tracing::info!(path = %output.display(), "transition report generated");
        }
        Commands::Scan { directory } => {
            let entries = scan_track_library(&directory)?;
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
    }

    Ok(())
}

fn demo_plan_request() -> PlanRequest {
    PlanRequest {
        beats_length: 32,
        strategy: TempoStrategy::MatchBToA,
        options: PlanOptions {
            smart_length: true,
            phrase_align: true,
            harmonic_match: true,
            ..PlanOptions::default()
        },
    }
}
