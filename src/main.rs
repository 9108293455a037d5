// Entry point and high-level CLI flow.
//
// - Option [1] loads and normalizes the report snapshot, printing diagnostics.
// - Option [2] shows the dashboard for the selected role.
// - Option [3] browses the report list with search, status filter and paging.
// - Option [4] exports the report list to CSV and the analytics to JSON.
use civic_report::config::AppConfig;
use civic_report::dashboard::{DashboardView, Role, Snapshot, ViewContext};
use civic_report::geo::CityScope;
use civic_report::search::{SearchQuery, StatusFilter};
use civic_report::{loader, output, util};
use clap::Parser;
use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Parser)]
#[command(name = "civic-report", about = "Analytics over civic issue reports")]
struct Args {
    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Report snapshot (.json or .csv); overrides `data_path`.
    #[arg(long)]
    data: Option<PathBuf>,
    /// City scope for admin analytics ("all" for no restriction).
    #[arg(long, default_value = "all")]
    city: String,
    /// Backend base address; overrides `api_base`.
    #[arg(long)]
    api_base: Option<String>,
    /// Dashboard role tag, e.g. `gov_admin`, `dept_head`, `civilian`.
    #[arg(long, default_value = "gov_admin")]
    role: String,
    /// User id for the civilian and field officer views.
    #[arg(long)]
    user: Option<String>,
}

// In-memory app state so the snapshot is loaded once but views can be
// rebuilt many times in a single run.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { snapshot: None }));

struct AppState {
    snapshot: Option<Snapshot>,
}

fn state() -> MutexGuard<'static, AppState> {
    APP_STATE.lock().unwrap_or_else(|e| e.into_inner())
}

fn prompt(label: &str) -> String {
    print!("{label}: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Read a single line of input after printing the common "Enter choice:" prompt.
fn read_choice() -> String {
    prompt("Enter choice")
}

/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        match prompt("Back to Main Menu (Y/N)").to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn current_snapshot() -> Option<Snapshot> {
    let snapshot = state().snapshot.clone();
    if snapshot.is_none() {
        println!("Error: No data loaded. Please load the report file first (option 1).\n");
    }
    snapshot
}

/// Handle option [1]: load and normalize the snapshot.
///
/// A failed load keeps whatever snapshot was loaded before.
fn handle_load(config: &AppConfig) {
    let now_ms = chrono::Utc::now().timestamp_millis();
    match loader::load_reports(&config.data_path, now_ms) {
        Ok((reports, load_report)) => {
            println!(
                "Processing reports... ({} rows read, {} loaded)",
                util::format_int(load_report.total_rows),
                util::format_int(load_report.loaded())
            );
            println!(
                "Note: {} rows skipped due to parse errors.",
                util::format_int(load_report.parse_errors)
            );
            if load_report.defaulted_timestamps > 0 {
                println!(
                    "Info: {} reports had no timestamp and were dated now.",
                    util::format_int(load_report.defaulted_timestamps)
                );
            }
            if load_report.missing_coords > 0 {
                println!(
                    "Info: {} reports have no coordinates and are left out of city views.",
                    util::format_int(load_report.missing_coords)
                );
            }
            println!();
            state().snapshot = Some(Snapshot::new(reports, config));
        }
        Err(e) => {
            eprintln!("Failed to load {}: {}\n", config.data_path.display(), e);
        }
    }
}

fn print_view(view: &DashboardView) {
    match view {
        DashboardView::Admin(a) => {
            let s = &a.aggregates.status;
            println!(
                "Total: {}  Pending: {}  In progress: {}  Resolved: {} ({}%)\n",
                util::format_int(s.total),
                util::format_int(s.pending),
                util::format_int(s.in_progress),
                util::format_int(s.resolved),
                util::format_number(s.resolution_rate(), 1)
            );
            println!("Reports by Status");
            output::preview_table_rows(&a.aggregates.by_status.rows(), 4);
            println!("Reports by Severity");
            output::preview_table_rows(&a.aggregates.by_severity.rows(), 3);
            println!("Top Categories");
            output::preview_table_rows(&a.top_categories, a.top_categories.len());
            println!("Reports by Department");
            output::preview_table_rows(&a.aggregates.by_department.rows(), 10);
            println!("Daily Trend");
            output::preview_table_rows(&a.trend, a.trend.len());
            println!("Recent Reports");
            output::preview_table_rows(&output::report_rows(&a.recent), a.recent.len());
        }
        DashboardView::DeptHead(d) => {
            println!(
                "Department total: {}  Pending: {}  In progress: {}  Resolved: {}\n",
                d.status.total, d.status.pending, d.status.in_progress, d.status.resolved
            );
            println!("Awaiting Assignment");
            let rows = output::report_rows(&d.awaiting_assignment);
            output::preview_table_rows(&rows, rows.len());
        }
        DashboardView::FieldOfficer(f) => {
            println!(
                "Assigned: {}  Resolved: {}  Open tasks: {}\n",
                f.status.total,
                f.status.resolved,
                f.tasks.len()
            );
            let rows = output::report_rows(&f.tasks);
            output::preview_table_rows(&rows, rows.len());
        }
        DashboardView::Civilian(score) => {
            println!(
                "My reports: {}  Resolved: {}  Impact XP: {}\n",
                util::format_int(score.total),
                util::format_int(score.resolved),
                util::format_int(score.impact)
            );
        }
    }
}

/// Handle option [2]: the role's dashboard.
fn handle_dashboard(role: Role, ctx: &ViewContext) {
    let Some(snapshot) = current_snapshot() else {
        return;
    };
    println!("Dashboard ({role:?})\n");
    print_view(&snapshot.view(role, ctx, &chrono::Local::now()));
}

/// Handle option [3]: search and page through the full report list.
fn handle_browse() {
    let Some(snapshot) = current_snapshot() else {
        return;
    };
    let text = prompt("Search (blank for all)");
    let status = loop {
        let input = prompt("Status [all/open/assigned/in_progress/resolved]");
        match StatusFilter::parse(&input) {
            Some(filter) => break filter,
            None => println!("Unknown status '{input}'."),
        }
    };
    let mut query = SearchQuery {
        text,
        status,
        page: 1,
    };
    loop {
        let page = snapshot.browse(&query);
        output::preview_table_rows(&output::report_rows(page.items.iter().copied()), page.page_size);
        let first = (page.page - 1) * page.page_size;
        println!(
            "Showing {}-{} of {} (page {} of {})",
            (first + 1).min(page.total_matched),
            first + page.items.len(),
            util::format_int(page.total_matched),
            page.page,
            page.total_pages.max(1)
        );
        match prompt("[n]ext, [p]rev, [q]uit").to_lowercase().as_str() {
            "n" if page.page < page.total_pages => query.page += 1,
            "p" if page.page > 1 => query.page -= 1,
            "q" => break,
            _ => println!("No page there."),
        }
    }
    println!();
}

/// Handle option [4]: CSV export of the list plus the analytics as JSON.
fn handle_export(city: &CityScope) {
    let Some(snapshot) = current_snapshot() else {
        return;
    };
    let stamp = chrono::Local::now().format("%Y-%m-%d");
    let csv_path = PathBuf::from(format!("reports_export_{stamp}.csv"));
    if let Err(e) = output::export_reports_csv(&csv_path, snapshot.reports()) {
        eprintln!("Write error: {}", e);
    }
    let json_path = PathBuf::from("analytics.json");
    let analytics = snapshot.admin_analytics(city, &chrono::Local::now());
    if let Err(e) = output::write_json(&json_path, &analytics) {
        eprintln!("Write error: {}", e);
    }
    println!(
        "Outputs saved to {} and {}\n",
        csv_path.display(),
        json_path.display()
    );
}

fn load_config(args: &Args) -> civic_report::Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if let Some(data) = &args.data {
        config.data_path = data.clone();
    }
    if let Some(api_base) = &args.api_base {
        config.api_base = api_base.clone();
    }
    Ok(config)
}

fn main() {
    pretty_env_logger::init();
    let args = Args::parse();
    let config = match load_config(&args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    log::debug!("report source: {}", config.reports_url());
    if let CityScope::City(key) = CityScope::parse(&args.city) {
        let cities = config.city_table();
        if cities.get(&key).is_none() {
            let known: Vec<&str> = cities.keys().collect();
            println!("Unknown city '{key}', showing all. Known: {}\n", known.join(", "));
        }
    }

    let role = Role::parse(&args.role);
    let ctx = ViewContext {
        user_id: args.user.clone(),
        city: CityScope::parse(&args.city),
    };

    loop {
        println!("Civic Report Analytics:");
        println!("[1] Load the file");
        println!("[2] Show Dashboard");
        println!("[3] Browse Reports");
        println!("[4] Export Reports");
        println!("[5] Exit\n");
        match read_choice().as_str() {
            "1" => handle_load(&config),
            "2" => {
                println!();
                handle_dashboard(role, &ctx);
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            "3" => handle_browse(),
            "4" => handle_export(&ctx.city),
            "5" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 1 to 5.\n"),
        }
    }
}
