use clap::{Args, Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::RequestBuilder;
use serde_json::{Map, Value};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "lbctl")]
#[command(about = "Management CLI for the load balancer control plane", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:9876")]
    url: String,

    #[arg(short, long, env = "LBCTL_API_KEY", default_value = "CHANGE_ME_IN_PRODUCTION")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show load balancer and listener statuses, or service status without an id
    Status {
        load_balancer: Option<Uuid>,
    },
    /// Show a pool's health monitor
    Show(Target),
    /// Create a health monitor on a pool
    Create {
        #[command(flatten)]
        target: Target,
        /// Probe type: HTTP, HTTPS, PING or TCP
        #[arg(long = "type")]
        monitor_type: String,
        #[arg(long)]
        delay: u32,
        #[arg(long)]
        timeout: u32,
        #[arg(long)]
        max_retries: u32,
        #[command(flatten)]
        probe: ProbeArgs,
    },
    /// Update a pool's health monitor
    Update {
        #[command(flatten)]
        target: Target,
        #[arg(long = "type")]
        monitor_type: Option<String>,
        #[arg(long)]
        delay: Option<u32>,
        #[arg(long)]
        timeout: Option<u32>,
        #[arg(long)]
        max_retries: Option<u32>,
        #[command(flatten)]
        probe: ProbeArgs,
    },
    /// Delete a pool's health monitor
    Delete(Target),
}

#[derive(Args)]
struct Target {
    /// Load balancer id
    load_balancer: Uuid,
    /// Pool id
    pool: Uuid,
    /// Address the pool through this listener
    #[arg(long)]
    listener: Option<Uuid>,
}

impl Target {
    fn url(&self, base: &str) -> String {
        match self.listener {
            Some(listener) => format!(
                "{}/v1/loadbalancers/{}/listeners/{}/pools/{}/healthmonitor",
                base, self.load_balancer, listener, self.pool
            ),
            None => format!(
                "{}/v1/loadbalancers/{}/pools/{}/healthmonitor",
                base, self.load_balancer, self.pool
            ),
        }
    }
}

#[derive(Args)]
struct ProbeArgs {
    #[arg(long)]
    http_method: Option<String>,
    #[arg(long)]
    url_path: Option<String>,
    #[arg(long)]
    expected_codes: Option<String>,
    #[arg(long)]
    enabled: Option<bool>,
}

impl ProbeArgs {
    fn extend(self, body: &mut Map<String, Value>) {
        insert(body, "http_method", self.http_method);
        insert(body, "url_path", self.url_path);
        insert(body, "expected_codes", self.expected_codes);
        insert(body, "enabled", self.enabled);
    }
}

fn insert<T: Into<Value>>(body: &mut Map<String, Value>, key: &str, value: Option<T>) {
    if let Some(value) = value {
        body.insert(key.to_string(), value.into());
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );
    let client = reqwest::Client::builder().default_headers(headers).build()?;
    let base = cli.url.trim_end_matches('/');

    let request: RequestBuilder = match cli.command {
        Commands::Status { load_balancer: None } => client.get(format!("{}/v1/status", base)),
        Commands::Status { load_balancer: Some(id) } => {
            client.get(format!("{}/v1/loadbalancers/{}/status", base, id))
        }
        Commands::Show(target) => client.get(target.url(base)),
        Commands::Create {
            target,
            monitor_type,
            delay,
            timeout,
            max_retries,
            probe,
        } => {
            let mut body = Map::new();
            body.insert("type".into(), monitor_type.into());
            body.insert("delay".into(), delay.into());
            body.insert("timeout".into(), timeout.into());
            body.insert("max_retries".into(), max_retries.into());
            probe.extend(&mut body);
            client.post(target.url(base)).json(&body)
        }
        Commands::Update {
            target,
            monitor_type,
            delay,
            timeout,
            max_retries,
            probe,
        } => {
            let mut body = Map::new();
            insert(&mut body, "type", monitor_type);
            insert(&mut body, "delay", delay);
            insert(&mut body, "timeout", timeout);
            insert(&mut body, "max_retries", max_retries);
            probe.extend(&mut body);
            client.put(target.url(base)).json(&body)
        }
        Commands::Delete(target) => client.delete(target.url(base)),
    };

    print_response(request.send().await?).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: control plane returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
