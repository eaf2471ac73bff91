use anyhow::{anyhow, Context};
use clap::Parser;
use http::Method;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use switchyard::logging::init_logging;
use switchyard::middleware::TracingMiddleware;
use switchyard::server::{AppService, HttpServer};
use switchyard::{App, AppConfig, HandlerResult, PathParams, Request, Resource, Response};
use tracing::info;

/// Demo application serving a handful of example routes
#[derive(Parser)]
#[command(name = "switchyard", version, about, long_about = None)]
struct Cli {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8080", env = "SWITCHYARD_ADDR")]
    addr: String,

    /// Templates directory (overrides SWITCHYARD_TEMPLATES_DIR)
    #[arg(long)]
    templates: Option<PathBuf>,

    /// Static files directory (overrides SWITCHYARD_STATIC_DIR)
    #[arg(long)]
    static_dir: Option<PathBuf>,
}

#[derive(Default)]
struct Books;

impl Books {
    fn get(&mut self, _req: &Request, res: &mut Response, _p: &PathParams) -> HandlerResult {
        res.text = Some("Hello from the Books Page".to_string());
        Ok(())
    }

    fn post(&mut self, _req: &Request, res: &mut Response, _p: &PathParams) -> HandlerResult {
        res.text = Some("Endpoint to create a book".to_string());
        Ok(())
    }
}

fn home(_req: &Request, res: &mut Response, _p: &PathParams) -> HandlerResult {
    res.text = Some("Hello from the Home Page".to_string());
    Ok(())
}

fn about(_req: &Request, res: &mut Response, _p: &PathParams) -> HandlerResult {
    res.text = Some("Hello from the About Page".to_string());
    Ok(())
}

fn greeting(_req: &Request, res: &mut Response, params: &PathParams) -> HandlerResult {
    let name = params.get("name").unwrap_or_default();
    res.text = Some(format!("Hello {name}"));
    Ok(())
}

fn new_handler(_req: &Request, res: &mut Response, _p: &PathParams) -> HandlerResult {
    res.text = Some("From new Handler".to_string());
    Ok(())
}

fn json_handler(_req: &Request, res: &mut Response, _p: &PathParams) -> HandlerResult {
    res.json = Some(json!({"name": "some name", "type": "json"}));
    Ok(())
}

fn exception_throwing_handler(_req: &Request, _res: &mut Response, _p: &PathParams) -> HandlerResult {
    Err(anyhow!("some exception"))
}

fn build_app(config: AppConfig) -> anyhow::Result<App> {
    let mut app = App::with_config(config);

    app.add_route("/home", home, Some(&[Method::GET]))?;
    app.add_route("/about", about, Some(&[Method::PUT]))?;
    app.add_route("/hello/{name}", greeting, None)?;
    app.add_route(
        "/books",
        Resource::<Books>::new().get(Books::get).post(Books::post),
        None,
    )?;
    app.add_route("/new-handler", new_handler, None)?;

    let templates = app.templates().clone();
    app.add_route(
        "/template",
        move |_req: &Request, res: &mut Response, _p: &PathParams| -> HandlerResult {
            res.html = Some(templates.render(
                "home.html",
                json!({"new_title": "Best title", "new_body": "Best body"}),
            )?);
            Ok(())
        },
        None,
    )?;
    app.add_route("/json", json_handler, None)?;
    app.add_route("/exception", exception_throwing_handler, None)?;

    app.add_exception_handler(|_req, res, err| {
        res.text = Some(err.to_string());
    });
    app.add_middleware(Arc::new(TracingMiddleware::new()));

    Ok(app)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::from_env();
    if let Some(dir) = cli.templates {
        config = config.with_templates_dir(dir);
    }
    if let Some(dir) = cli.static_dir {
        config = config.with_static_dir(dir);
    }
    let _log_guard = init_logging(&config.log)?;

    let app = Arc::new(build_app(config)?);
    info!(routes = ?app.routes(), "Routes registered");

    let handle = HttpServer(AppService::new(app))
        .start(cli.addr.as_str())
        .with_context(|| format!("failed to bind {}", cli.addr))?;
    handle
        .join()
        .map_err(|_| anyhow!("server coroutine panicked"))?;
    Ok(())
}
