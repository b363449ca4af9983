use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use tc_collection::{ComfortCollection, ComfortSeries};
use tc_core::units::constants::{STANDARD_PRESSURE_PA, standard_pressure};
use tc_core::units::pa;
use tc_criteria::{PetParameter, PmvParameter, ThermalCondition, UtciParameter};
use tc_factory::{
    DEFAULT_CLO, DEFAULT_EXTERNAL_WORK, DEFAULT_INDOOR_MET, DEFAULT_OUTDOOR_MET, FactoryConfig,
    FactoryResult, ModelRequest, build_collection, load_config, load_weather,
};
use tc_models::pmv::DEFAULT_STILL_AIR_THRESHOLD;
use tc_models::psychrometrics::humid_ratio_from_db_rh;
use tc_models::{
    PetBody, SetConfig, SetOutcome, ThermalInputs, physiologic_equivalent_temperature, pierce_set,
    predicted_mean_vote, utci_evaluate,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "tc-cli")]
#[command(about = "ThermoComfort CLI - thermal comfort indices for single conditions and weather records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Universal Thermal Climate Index of one outdoor condition
    #[command(allow_negative_numbers = true)]
    Utci {
        #[command(flatten)]
        climate: Climate,
    },
    /// PMV and PPD (with SET and the elevated air speed correction)
    #[command(allow_negative_numbers = true)]
    Pmv {
        #[command(flatten)]
        climate: Climate,
        #[command(flatten)]
        person: Person,
    },
    /// Standard Effective Temperature from the two-node model
    #[command(allow_negative_numbers = true)]
    Set {
        #[command(flatten)]
        climate: Climate,
        #[command(flatten)]
        person: Person,
    },
    /// Physiological Equivalent Temperature from the two-node energy balance
    #[command(allow_negative_numbers = true)]
    Pet {
        #[command(flatten)]
        climate: Climate,
        #[command(flatten)]
        body: Body,
    },
    /// Comfort statistics of a weather record (YAML or JSON)
    Weather {
        /// Path to the weather file
        weather_path: PathBuf,
        /// Comfort model to evaluate
        #[arg(long, value_enum, default_value_t = Model::Utci)]
        model: Model,
        /// Shelter the person from the recorded wind
        #[arg(long)]
        no_wind: bool,
        /// Shade the person from the sun
        #[arg(long)]
        no_sun: bool,
        /// Factory config file (YAML or JSON)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Include the per-step index and condition series
        #[arg(long)]
        series: bool,
    },
}

#[derive(Args)]
struct Climate {
    /// Air temperature (C)
    ta: f64,
    /// Mean radiant temperature (C)
    tr: f64,
    /// Air speed (m/s)
    vel: f64,
    /// Relative humidity (%)
    rh: f64,
}

#[derive(Args)]
struct Person {
    /// Metabolic rate (met)
    #[arg(long, default_value_t = DEFAULT_INDOOR_MET)]
    met: f64,
    /// Clothing insulation (clo)
    #[arg(long, default_value_t = DEFAULT_CLO)]
    clo: f64,
    /// External work (met)
    #[arg(long, default_value_t = DEFAULT_EXTERNAL_WORK)]
    wme: f64,
}

#[derive(Args)]
struct Body {
    /// Metabolic rate (met)
    #[arg(long, default_value_t = DEFAULT_OUTDOOR_MET)]
    met: f64,
    /// Clothing insulation (clo)
    #[arg(long, default_value_t = DEFAULT_CLO)]
    clo: f64,
    /// Age (years)
    #[arg(long, default_value_t = 36.0)]
    age: f64,
    /// 0 for male, 1 for female; values between blend the two
    #[arg(long, default_value_t = 0.5)]
    sex: f64,
    /// Height (m)
    #[arg(long, default_value_t = 1.65)]
    height: f64,
    /// Body mass (kg)
    #[arg(long, default_value_t = 62.0)]
    body_mass: f64,
    /// Barometric pressure (Pa)
    #[arg(long, default_value_t = STANDARD_PRESSURE_PA)]
    pressure: f64,
    /// Classify on the scale for people acclimated to hot, humid climates
    #[arg(long)]
    humid: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Model {
    Utci,
    Pmv,
    Adaptive,
    Pet,
}

fn thermal_inputs(climate: &Climate, person: &Person) -> ThermalInputs {
    ThermalInputs {
        ta: climate.ta,
        tr: climate.tr,
        vel: climate.vel,
        rh: climate.rh,
        met: person.met,
        clo: person.clo,
        wme: person.wme,
    }
}

fn main() -> FactoryResult<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tc_cli=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let output = match cli.command {
        Commands::Utci { climate } => cmd_utci(&climate),
        Commands::Pmv { climate, person } => cmd_pmv(&climate, &person),
        Commands::Set { climate, person } => cmd_set(&climate, &person),
        Commands::Pet { climate, body } => cmd_pet(&climate, &body)?,
        Commands::Weather {
            weather_path,
            model,
            no_wind,
            no_sun,
            config,
            series,
        } => cmd_weather(
            &weather_path,
            model,
            !no_wind,
            !no_sun,
            config.as_deref(),
            series,
        )?,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn cmd_utci(climate: &Climate) -> Value {
    let out = utci_evaluate(climate.ta, climate.tr, climate.vel, climate.rh);
    let parameter = UtciParameter::default();
    json!({
        "utci": out.utci,
        "wind_clamped": out.wind_clamped,
        "category": parameter.category(out.utci).label(),
        "condition": parameter.thermal_condition(out.utci),
        "comfortable": parameter.is_comfortable(out.utci),
    })
}

fn cmd_pmv(climate: &Climate, person: &Person) -> Value {
    let inputs = thermal_inputs(climate, person);
    let result = predicted_mean_vote(&inputs, DEFAULT_STILL_AIR_THRESHOLD, &SetConfig::default());
    let parameter = PmvParameter::default();
    let converged = result.convergence.is_converged();
    let humidity_ratio = humid_ratio_from_db_rh(climate.ta, climate.rh, standard_pressure());
    let condition = if converged {
        parameter.thermal_condition(result.pmv, result.ppd)
    } else {
        ThermalCondition::Unresolved
    };
    json!({
        "pmv": result.pmv,
        "ppd": result.ppd,
        "set": result.set,
        "ta_adj": result.ta_adj,
        "cooling_effect": result.cooling_effect,
        "heat_loss": result.heat_loss,
        "converged": converged,
        "set_converged": result.set_convergence.is_converged(),
        "condition": condition,
        "comfortable": converged && parameter.is_comfortable(result.ppd, humidity_ratio),
    })
}

fn cmd_set(climate: &Climate, person: &Person) -> Value {
    match pierce_set(&thermal_inputs(climate, person), &SetConfig::default()) {
        SetOutcome::Converged { set, iterations } => json!({
            "set": set,
            "converged": true,
            "iterations": iterations,
        }),
        SetOutcome::NonConverged {
            last_estimate,
            iterations,
            stage,
        } => json!({
            "set": last_estimate.is_finite().then_some(last_estimate),
            "converged": false,
            "iterations": iterations,
            "stage": stage,
        }),
    }
}

fn cmd_pet(climate: &Climate, body: &Body) -> FactoryResult<Value> {
    let person = PetBody {
        age: body.age,
        sex: body.sex,
        height: body.height,
        body_mass: body.body_mass,
        ..PetBody::default()
    };
    let parameter = PetParameter::new(person, body.humid)?;
    let inputs = ThermalInputs::new(
        climate.ta,
        climate.tr,
        climate.vel,
        climate.rh,
        body.met,
        body.clo,
    );
    let result = physiologic_equivalent_temperature(&inputs, parameter.body(), pa(body.pressure))?;
    let converged = result.convergence.is_converged();
    let condition = if converged {
        parameter.thermal_condition(result.pet)
    } else {
        ThermalCondition::Unresolved
    };
    Ok(json!({
        "pet": result.pet,
        "core_temperature": result.t_core,
        "skin_temperature": result.t_skin,
        "clothing_temperature": result.t_clo,
        "category": parameter.category(result.pet),
        "core_temperature_category": parameter.core_temperature_category(result.t_core),
        "converged": converged,
        "condition": condition,
        "comfortable": converged && parameter.is_comfortable(result.pet),
    }))
}

fn cmd_weather(
    weather_path: &Path,
    model: Model,
    wind: bool,
    sun: bool,
    config_path: Option<&Path>,
    series: bool,
) -> FactoryResult<Value> {
    let weather = load_weather(weather_path)?;
    let config = match config_path {
        Some(path) => load_config(path)?,
        None => FactoryConfig::default(),
    };
    let request = match model {
        Model::Utci => ModelRequest::Utci { wind, sun },
        Model::Pmv => ModelRequest::Pmv { wind, sun },
        Model::Adaptive => ModelRequest::Adaptive { wind, sun },
        Model::Pet => ModelRequest::Pet { wind, sun },
    };
    let collection = build_collection(&weather, &request, &config)?;

    let mut output = json!({
        "location": weather.location.name,
        "request": request,
        "summary": collection.summary(),
    });
    if let ComfortCollection::Utci(utci) = &collection {
        let breakdown: serde_json::Map<String, Value> = utci
            .stress_breakdown()
            .into_iter()
            .map(|(category, percent)| (category.label().to_string(), json!(percent)))
            .collect();
        output["stress_breakdown"] = Value::Object(breakdown);
    }
    if let ComfortCollection::Pet(pet) = &collection {
        output["percent_hypothermia"] = json!(pet.percent_hypothermia());
        output["percent_hyperthermia"] = json!(pet.percent_hyperthermia());
    }
    if series {
        output["index"] = json!(collection.index().values());
        output["condition"] = json!(collection.thermal_condition().values());
    }
    Ok(output)
}
