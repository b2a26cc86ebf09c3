//! jresolve
//!
//! Type-model queries over a JSON class-path model.

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use jresolve::feedback::{
    self, AssignabilityReport, CheckReport, ErrorReport, Location, MemberTypesReport, MethodsReport,
    ResolutionReport,
};
use jresolve::loader::{require, Bootstrap, ModelLoader};
use jresolve::model::{is_applicable, maximally_specific, IMethod, TypeArena, TypeId};
use jresolve::types::descriptor;
use jresolve::utils;

/// jresolve type-model queries
#[derive(Parser, Debug)]
#[command(name = "jresolve")]
#[command(version = "0.1.0")]
#[command(about = "Subtyping, member lookup and overload queries over a class-path model")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Emit JSON reports instead of text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load every class and validate its supertype graph
    Check {
        /// Class-path model (.json)
        model: PathBuf,
    },
    /// Whether a value of SOURCE type may be assigned to TARGET
    Assignable {
        model: PathBuf,
        target: String,
        /// `null` stands for the null literal
        source: String,
    },
    /// List declared and inherited methods
    Methods { model: PathBuf, class: String },
    /// Search member types visible in a class
    MemberTypes {
        model: PathBuf,
        class: String,
        /// Simple name; all member types if omitted
        name: Option<String>,
    },
    /// Pick the most specific method for an invocation
    Resolve {
        model: PathBuf,
        class: String,
        method: String,
        /// Static argument types; `null` for the null literal
        arguments: Vec<String>,
    },
}

/// A loaded model and the arena it loads into
struct Session {
    file: String,
    arena: TypeArena,
    loader: ModelLoader,
}

impl Session {
    fn open(path: &Path) -> Result<Self> {
        let loader = ModelLoader::from_path(path)
            .with_context(|| format!("failed to load class-path model {}", path.display()))?;
        let arena = TypeArena::new();
        Bootstrap::install_with(&arena, &loader).context("failed to install built-in types")?;
        info!("opened {} ({} classes)", path.display(), loader.class_names().len());
        Ok(Self {
            file: path.display().to_string(),
            arena,
            loader,
        })
    }

    fn ty(&self, name: &str) -> utils::Result<TypeId> {
        let name = if name == "null" { "void" } else { name };
        require(&self.arena, &self.loader, name, None)
    }

    fn report(&self, error: &utils::Error) -> ErrorReport {
        ErrorReport::from_error(error, &self.file, self.loader.class_names())
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(2);
        }
    }
}

/// `Ok(false)` when the query itself failed and has been reported
fn run(cli: &Cli) -> Result<bool> {
    let (session, outcome) = match &cli.command {
        Commands::Check { model } => {
            let session = Session::open(model)?;
            return Ok(check(&session, cli.json));
        }
        Commands::Assignable { model, target, source } => {
            let session = Session::open(model)?;
            let outcome = assignable(&session, target, source, cli.json);
            (session, outcome)
        }
        Commands::Methods { model, class } => {
            let session = Session::open(model)?;
            let outcome = methods(&session, class, cli.json);
            (session, outcome)
        }
        Commands::MemberTypes { model, class, name } => {
            let session = Session::open(model)?;
            let outcome = member_types(&session, class, name.as_deref(), cli.json);
            (session, outcome)
        }
        Commands::Resolve {
            model,
            class,
            method,
            arguments,
        } => {
            let session = Session::open(model)?;
            let outcome = resolve(&session, class, method, arguments, cli.json);
            (session, outcome)
        }
    };
    match outcome {
        Ok(()) => Ok(true),
        Err(error) => {
            let report = session.report(&error);
            if cli.json {
                println!("{}", feedback::to_json(&report));
            } else {
                print_diagnostic(&report);
            }
            Ok(false)
        }
    }
}

fn print_diagnostic(report: &ErrorReport) {
    match &report.location {
        Some(Location { file, start, end }) => {
            eprintln!("error[{}]: {} ({}:{}..{})", report.code, report.message, file, start, end)
        }
        None => eprintln!("error[{}]: {}", report.code, report.message),
    }
    for suggestion in &report.suggestions {
        eprintln!("  help: {}", suggestion.message);
    }
}

/// Load every class of the model and compute its supertypes and methods
fn check(session: &Session, json: bool) -> bool {
    let mut diagnostics = Vec::new();
    let mut classes = 0;
    for name in session.loader.class_names() {
        if descriptor::from_class_name(name).is_ok_and(|d| is_builtin(&d)) {
            diagnostics.push(ErrorReport::warning(
                "W0001",
                &format!("{} replaces the built-in type", name),
                None,
            ));
        }
        let checked = session.ty(name).and_then(|id| {
            session.arena.superclass(id)?;
            session.arena.interfaces(id)?;
            session.arena.methods(id)?;
            Ok(())
        });
        match checked {
            Ok(()) => classes += 1,
            Err(error) => diagnostics.push(session.report(&error)),
        }
    }

    let report = CheckReport {
        success: classes == session.loader.class_names().len(),
        model: session.file.clone(),
        classes,
        diagnostics,
    };
    if json {
        println!("{}", feedback::to_json(&report));
    } else {
        println!("Checking: {}", report.model);
        for diagnostic in &report.diagnostics {
            if diagnostic.severity == feedback::Severity::Warning {
                eprintln!("warning[{}]: {}", diagnostic.code, diagnostic.message);
            } else {
                print_diagnostic(diagnostic);
            }
        }
        if report.success {
            println!("✅ No errors found ({} classes)", report.classes);
        }
    }
    report.success
}

fn is_builtin(desc: &str) -> bool {
    matches!(
        desc,
        descriptor::JAVA_LANG_OBJECT
            | descriptor::JAVA_LANG_CLONEABLE
            | descriptor::JAVA_IO_SERIALIZABLE
            | descriptor::JAVA_LANG_STRING
    )
}

fn assignable(session: &Session, target: &str, source: &str, json: bool) -> utils::Result<()> {
    let report = AssignabilityReport {
        target: target.to_string(),
        source: source.to_string(),
        assignable: session
            .arena
            .is_assignable_from(session.ty(target)?, session.ty(source)?)?,
    };
    if json {
        println!("{}", feedback::to_json(&report));
    } else {
        println!("{}", report.assignable);
    }
    Ok(())
}

fn methods(session: &Session, class: &str, json: bool) -> utils::Result<()> {
    let id = session.ty(class)?;
    let report = MethodsReport {
        class: session.arena.class_name(id),
        methods: session
            .arena
            .methods(id)?
            .iter()
            .map(|m| session.arena.display(m).to_string())
            .collect(),
    };
    if json {
        println!("{}", feedback::to_json(&report));
    } else {
        for method in &report.methods {
            println!("{}", method);
        }
    }
    Ok(())
}

fn member_types(session: &Session, class: &str, name: Option<&str>, json: bool) -> utils::Result<()> {
    let id = session.ty(class)?;
    let found = session.arena.find_member_type(id, name)?;
    let report = MemberTypesReport::new(
        session.arena.class_name(id),
        name,
        found.iter().map(|t| session.arena.class_name(*t)).collect(),
    );
    if json {
        println!("{}", feedback::to_json(&report));
    } else {
        for member in &report.member_types {
            println!("{}", member);
        }
        if report.ambiguous {
            eprintln!("warning: {} is ambiguous in {}", name.unwrap_or_default(), report.class);
        }
    }
    Ok(())
}

fn resolve(session: &Session, class: &str, method: &str, arguments: &[String], json: bool) -> utils::Result<()> {
    let id = session.ty(class)?;
    let argument_types = arguments
        .iter()
        .map(|a| session.ty(a))
        .collect::<utils::Result<Vec<_>>>()?;

    let mut applicable: Vec<IMethod> = Vec::new();
    for candidate in session.arena.methods(id)?.iter().filter(|m| m.name() == method) {
        if is_applicable(&session.arena, candidate, &argument_types)? {
            applicable.push(candidate.clone());
        }
    }
    let most_specific = maximally_specific(&session.arena, &applicable)?;

    let render = |m: &IMethod| session.arena.display(m).to_string();
    let report = ResolutionReport {
        class: session.arena.class_name(id),
        method: method.to_string(),
        arguments: arguments.to_vec(),
        applicable: applicable.iter().map(render).collect(),
        most_specific: most_specific.iter().map(|&m| render(m)).collect(),
        outcome: ResolutionReport::outcome_for(most_specific.len()),
    };
    if json {
        println!("{}", feedback::to_json(&report));
    } else {
        match report.outcome {
            feedback::Outcome::Resolved => println!("{}", report.most_specific[0]),
            feedback::Outcome::Ambiguous => {
                println!("ambiguous:");
                for candidate in &report.most_specific {
                    println!("  {}", candidate);
                }
            }
            feedback::Outcome::NotFound => println!("no applicable method {}", method),
        }
    }
    Ok(())
}
