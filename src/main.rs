use ado_toolbox::config;
use ado_toolbox::mcp::server::ToolboxMcpServer;
use ado_toolbox::output::OutputFormat;
use ado_toolbox::server::http;
use ado_toolbox::tools::pr_comments::{self, config::PrCommentsConfig};
use ado_toolbox::tools::work_item::{self, config::WorkItemConfig};
use anyhow::Context;
use clap::{Parser, Subcommand};
use rmcp::ServiceExt;
use rmcp::transport::stdio;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "toolbox", author, version, about, long_about = None)]
struct Args {
    /// Print debug logging to stderr
    #[arg(long, global = true)]
    debug: bool,

    /// Directory holding the per-tool config files (default: ~/.toolbox)
    #[arg(long, global = true, env = config::CONFIG_DIR_ENV)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the comment threads of a pull request
    AdoPrComments {
        /// Pull request URL
        pr_url: String,

        /// Only show active threads (same as --status active)
        #[arg(long)]
        active: bool,

        /// Only show threads with this status; may be repeated
        #[arg(long = "status", value_name = "STATUS")]
        statuses: Vec<String>,

        /// Print JSON instead of the compact notation
        #[arg(long)]
        json: bool,

        /// Disable the configured content filter
        #[arg(long)]
        no_filter: bool,
    },

    /// Fetch a work item with its discussion, children and attachments
    AdoWorkItem {
        /// Work item URL
        work_item_url: String,

        /// Print JSON instead of the compact notation
        #[arg(long)]
        json: bool,

        /// Leave out the description
        #[arg(long)]
        no_description: bool,

        /// Skip the discussion (comments are not fetched)
        #[arg(long)]
        no_discussion: bool,

        /// Leave out child work items
        #[arg(long)]
        no_children: bool,

        /// Leave out attachments
        #[arg(long)]
        no_attachments: bool,

        /// Stop after this many comments (0 for all)
        #[arg(long, default_value_t = 0)]
        max_comments: usize,
    },

    /// Run the MCP server
    Mcp {
        /// Serve streamable HTTP instead of stdio
        #[arg(long)]
        server: bool,

        /// Port for --server
        #[arg(long, default_value_t = 3000)]
        port: u16,
    },

    /// Write the default config files
    InitConfig {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },
}

fn init_logging(debug: bool) {
    let default_filter = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn init_config(dir: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let dir = match dir {
        Some(dir) => dir,
        None => config::dir()?,
    };

    let files: [(&str, serde_json::Value); 2] = [
        (
            pr_comments::config::CONFIG_FILE,
            serde_json::to_value(PrCommentsConfig::default())?,
        ),
        (
            work_item::config::CONFIG_FILE,
            serde_json::to_value(WorkItemConfig::default())?,
        ),
    ];

    for (file, value) in files {
        if dir.join(file).exists() && !force {
            eprintln!("Skipping {} (exists; use --force to overwrite)", dir.join(file).display());
            continue;
        }
        let path = config::save_to(&dir, file, &value)
            .with_context(|| format!("writing {}", file))?;
        eprintln!("Wrote {}", path.display());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    init_logging(args.debug);

    match args.command {
        Command::AdoPrComments {
            pr_url,
            active,
            mut statuses,
            json,
            no_filter,
        } => {
            if active && !statuses.iter().any(|s| s == "active") {
                statuses.insert(0, "active".to_string());
            }
            let opts = pr_comments::Options {
                pr_url,
                statuses,
                format: OutputFormat::from_json_flag(json),
                no_filter,
                config_dir: args.config_dir,
            };
            let result = pr_comments::run(&opts).await?;
            if !result.summary.is_empty() {
                eprintln!("{}", result.summary);
            }
            println!("{}", result.output);
        }
        Command::AdoWorkItem {
            work_item_url,
            json,
            no_description,
            no_discussion,
            no_children,
            no_attachments,
            max_comments,
        } => {
            let opts = work_item::Options {
                work_item_url,
                include_description: !no_description,
                include_discussion: !no_discussion,
                include_children: !no_children,
                include_attachments: !no_attachments,
                max_comments,
                format: OutputFormat::from_json_flag(json),
                config_dir: args.config_dir,
            };
            let result = work_item::run(&opts).await?;
            println!("{}", result.output);
        }
        Command::Mcp { server, port } => {
            let mcp_server = ToolboxMcpServer::new(args.config_dir);
            if server {
                log::info!("Starting web server on port {}", port);
                http::run_server(mcp_server, port).await?;
            } else {
                log::info!("Starting stdio server");
                let service = mcp_server.serve(stdio()).await?;
                service.waiting().await?;
            }
        }
        Command::InitConfig { force } => init_config(args.config_dir, force)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn repeated_statuses_are_collected() {
        let args = Args::try_parse_from([
            "toolbox",
            "ado-pr-comments",
            "https://dev.azure.com/o/p/_git/r/pullrequest/1",
            "--status",
            "active",
            "--status",
            "pending",
            "--json",
        ])
        .unwrap();
        match args.command {
            Command::AdoPrComments { statuses, json, .. } => {
                assert_eq!(statuses, vec!["active", "pending"]);
                assert!(json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn work_item_flags() {
        let args = Args::try_parse_from([
            "toolbox",
            "--debug",
            "ado-work-item",
            "https://dev.azure.com/o/p/_workitems/edit/1",
            "--no-discussion",
            "--max-comments",
            "5",
        ])
        .unwrap();
        assert!(args.debug);
        match args.command {
            Command::AdoWorkItem {
                no_discussion,
                max_comments,
                no_children,
                ..
            } => {
                assert!(no_discussion);
                assert!(!no_children);
                assert_eq!(max_comments, 5);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn work_item_flags_have_help() {
        let command = Args::command();
        let sub = command.find_subcommand("ado-work-item").unwrap();
        for flag in ["no_description", "no_discussion", "no_children", "no_attachments"] {
            let arg = sub.get_arguments().find(|a| a.get_id() == flag).unwrap();
            assert!(arg.get_help().is_some(), "{flag} has no help");
        }
    }

    #[test]
    fn init_config_respects_force() {
        let tmp = tempfile::tempdir().unwrap();
        let pr_file = tmp.path().join(pr_comments::config::CONFIG_FILE);
        std::fs::write(&pr_file, "{\"custom\": true}").unwrap();

        init_config(Some(tmp.path().to_path_buf()), false).unwrap();
        assert_eq!(std::fs::read_to_string(&pr_file).unwrap(), "{\"custom\": true}");
        assert!(tmp.path().join(work_item::config::CONFIG_FILE).exists());

        init_config(Some(tmp.path().to_path_buf()), true).unwrap();
        let written: PrCommentsConfig =
            serde_json::from_str(&std::fs::read_to_string(&pr_file).unwrap()).unwrap();
        assert_eq!(written, PrCommentsConfig::default());
    }
}
