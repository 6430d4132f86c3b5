use std::path::PathBuf;

use night_sky::api::{
    CaptureOutcome, FileSystemSink, InMemoryBlobStore, StarMapController, StarMapSettings,
    SystemClock,
};
use night_sky::core::{FormField, FormState};
use night_sky::render::{CelestialConfig, SceneContainer, SkyRenderer};
use night_sky::telemetry::init_tracing;

const USAGE: &str = "usage: star_map_export [--date <YYYY-MM-DD>] [--time <HH:MM>] [--lat <deg>] [--lon <deg>] [--settings <path>] [--output-dir <dir>] [--print-config]";

struct CliArgs {
    fields: Vec<(FormField, String)>,
    settings: Option<PathBuf>,
    output_dir: PathBuf,
    print_config: bool,
}

fn main() {
    let _ = init_tracing("warn");
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = parse_args()?;
    let settings = match &args.settings {
        Some(path) => StarMapSettings::load(path)
            .map_err(|err| format!("failed to load `{}`: {err}", path.display()))?,
        None => StarMapSettings::default(),
    };
    let container_id = settings.container_id.clone();

    let form = FormState::now(&settings.default_location);
    let mut controller = StarMapController::with_form(
        settings,
        form,
        SkyRenderer::new(),
        InMemoryBlobStore::new(),
    )
    .map_err(|err| err.to_string())?
    .with_surface(SceneContainer::new(container_id));

    for (field, value) in args.fields {
        controller.update_field(field, value);
    }

    if args.print_config {
        let settings = controller.settings();
        let config = CelestialConfig::build(
            controller.form(),
            &settings.render,
            &settings.container_id,
            settings.coordinate_policy,
        )
        .map_err(|err| err.to_string())?;
        println!(
            "{}",
            config.to_renderer_json_pretty().map_err(|err| err.to_string())?
        );
    }

    let mut clock = SystemClock::default();
    match controller
        .generate_blocking(&mut clock)
        .map_err(|err| err.to_string())?
    {
        CaptureOutcome::Captured { .. } => {}
        CaptureOutcome::Failed { generation, failure } => {
            return Err(format!("generation {generation} failed: {failure:?}"));
        }
    }

    let mut sink = FileSystemSink::new(&args.output_dir);
    let filename = controller
        .download(&mut sink)
        .map_err(|err| err.to_string())?
        .ok_or_else(|| "no artifact captured".to_owned())?;
    println!("{}", args.output_dir.join(filename).display());
    Ok(())
}

fn parse_args() -> Result<CliArgs, String> {
    let mut args = std::env::args().skip(1);
    let mut fields = Vec::new();
    let mut settings = None::<PathBuf>;
    let mut output_dir = PathBuf::from(".");
    let mut print_config = false;

    while let Some(flag) = args.next() {
        let field = match flag.as_str() {
            "--date" => Some(FormField::Date),
            "--time" => Some(FormField::Time),
            "--lat" | "--latitude" => Some(FormField::Latitude),
            "--lon" | "--longitude" => Some(FormField::Longitude),
            _ => None,
        };
        if let Some(field) = field {
            let value = args
                .next()
                .ok_or_else(|| format!("missing value for {flag}"))?;
            fields.push((field, value));
            continue;
        }
        match flag.as_str() {
            "--settings" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --settings".to_owned())?;
                settings = Some(PathBuf::from(value));
            }
            "--output-dir" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --output-dir".to_owned())?;
                output_dir = PathBuf::from(value);
            }
            "--print-config" => print_config = true,
            "--help" | "-h" => return Err(USAGE.to_owned()),
            _ => return Err(format!("unknown argument `{flag}`\n{USAGE}")),
        }
    }

    Ok(CliArgs {
        fields,
        settings,
        output_dir,
        print_config,
    })
}
