//! Routing, session and table state behind the terminal front end.

use std::path::PathBuf;
use std::str::FromStr;

use tracing::{debug, info};

use crate::columns::{ColumnKey, COLUMNS};
use crate::config::Config;
use crate::enrich::{fetch_rows, AuthorFailurePolicy};
use crate::error::{Error, Result};
use crate::open_library_api::Catalog;
use crate::session::{resolve, Page, Resolution, Route, Session};
use crate::table;
use crate::view::{PageSize, ViewState};

pub const HELP: &str = "\
commands:
  open <path>           go to /login or /dashboard
  login [name]          log in and open the dashboard
  search <term>         search the catalog
  sort <column>         cycle ascending, descending, unsorted
  next | prev           change page
  page <n>              go to page n
  size <n>              rows per page (10, 20, 50, 100)
  edit <n>              edit row n of the current page
  set <column> <value>  change a cell of the row being edited
  save                  leave edit mode
  export [file]         write all rows as csv
  show                  redraw the table
  quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Open(String),
    Login(Option<String>),
    Search(String),
    Sort(ColumnKey),
    Next,
    Previous,
    /// One based page number
    Page(usize),
    Size(PageSize),
    /// One based row number on the visible page
    Edit(usize),
    Set(ColumnKey, String),
    Save,
    Export(Option<PathBuf>),
    Show,
    Help,
    Quit,
}

fn parse_number(word: &str, what: &str) -> Result<usize> {
    match word.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(Error::Command(format!(
            "{} must be a number from 1, got `{}`",
            what, word
        ))),
    }
}

fn parse_column(word: &str) -> Result<ColumnKey> {
    word.parse::<ColumnKey>().map_err(|e| {
        let names: Vec<_> = COLUMNS.iter().map(|c| c.key.name()).collect();
        Error::Command(format!("{} (columns: {})", e, names.join(", ")))
    })
}

fn required<'a>(word: &str, rest: &'a str, what: &str) -> Result<&'a str> {
    if rest.is_empty() {
        Err(Error::Command(format!("`{}` needs {}", word, what)))
    } else {
        Ok(rest)
    }
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let arg = |what: &str| required(word, rest, what);

        let command = match word {
            "" | "show" => Command::Show,
            "open" => Command::Open(arg("a path")?.to_string()),
            "login" => Command::Login(
                Some(rest)
                    .filter(|name| !name.is_empty())
                    .map(String::from),
            ),
            "search" => Command::Search(arg("a search term")?.to_string()),
            "sort" => Command::Sort(parse_column(arg("a column")?)?),
            "next" => Command::Next,
            "prev" | "previous" => Command::Previous,
            "page" => Command::Page(parse_number(arg("a page number")?, "page")?),
            "size" => Command::Size(arg("a page size")?.parse()?),
            "edit" => Command::Edit(parse_number(arg("a row number")?, "row")?),
            "set" => {
                let args = arg("a column and a value")?;
                let (column, value) = args
                    .split_once(char::is_whitespace)
                    .unwrap_or((args, ""));
                Command::Set(parse_column(column)?, value.trim().to_string())
            }
            "save" => Command::Save,
            "export" => Command::Export(
                Some(rest)
                    .filter(|file| !file.is_empty())
                    .map(PathBuf::from),
            ),
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => {
                return Err(Error::Command(format!(
                    "unknown command `{}`, try `help`",
                    other
                )))
            }
        };
        Ok(command)
    }
}

#[derive(Debug, PartialEq)]
pub enum Outcome {
    Show(String),
    Quit,
}

pub struct Dashboard<C> {
    catalog: C,
    session: Session,
    page: Page,
    view: ViewState,
    mounted: bool,
    policy: AuthorFailurePolicy,
    export_file: PathBuf,
}

impl<C: Catalog> Dashboard<C> {
    pub fn new(catalog: C, config: &Config) -> Self {
        Dashboard {
            catalog,
            session: Session::default(),
            page: Page::Login,
            view: ViewState::new(&config.query, config.page_size()),
            mounted: false,
            policy: config.author_failure_policy(),
            export_file: config.export_file.clone(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Follows redirects until a page renders. Mounting the dashboard the
    /// first time loads the initial search term.
    pub async fn navigate(&mut self, path: &str) -> Result<Page> {
        let mut path = path.to_string();
        let page = loop {
            match resolve(&path, &self.session) {
                Resolution::Render(page) => break page,
                Resolution::Redirect(route) => {
                    debug!(from = %path, to = route.path(), "redirect");
                    path = route.path().to_string();
                }
                Resolution::NotFound => {
                    return Err(Error::Command(format!("no page at {}", path)));
                }
            }
        };

        self.page = page;
        if page == Page::Dashboard && !self.mounted {
            self.mounted = true;
            let term = self.view.search_term().to_string();
            // a failed initial load is shown in the view like any other search
            let _ = self.search(&term).await;
        }
        Ok(page)
    }

    pub async fn login(&mut self, username: Option<&str>) -> Result<Page> {
        self.session.login(username);
        self.navigate(Route::Dashboard.path()).await
    }

    /// Replaces the row set on success; on failure the view keeps its rows
    /// and shows the fetch error.
    pub async fn search(&mut self, term: &str) -> Result<usize> {
        info!(term = %term, "searching");
        self.view.begin_search(term);
        match fetch_rows(&self.catalog, term, self.policy).await {
            Ok(rows) => {
                let count = rows.len();
                self.view.finish_search(Ok(rows));
                Ok(count)
            }
            Err(err) => {
                self.view.finish_search(Err(err.clone()));
                Err(err.into())
            }
        }
    }

    fn require_dashboard(&self) -> Result<()> {
        if !self.session.is_authenticated() {
            return Err(Error::Unauthorized(Route::Login.path().to_string()));
        }
        if self.page != Page::Dashboard {
            return Err(Error::Command(
                "open /dashboard to work with the table".to_string(),
            ));
        }
        Ok(())
    }

    pub fn render(&self) -> String {
        match self.page {
            Page::Login => "Book Dashboard\nLog in with `login [name]`.\n".to_string(),
            Page::Dashboard => table::render(&self.view),
        }
    }

    pub async fn execute(&mut self, command: Command) -> Result<Outcome> {
        match command {
            Command::Quit => return Ok(Outcome::Quit),
            Command::Help => return Ok(Outcome::Show(HELP.to_string())),
            Command::Show => {}
            Command::Open(path) => {
                self.navigate(&path).await?;
            }
            Command::Login(name) => {
                self.login(name.as_deref()).await?;
            }
            Command::Export(path) => {
                self.require_dashboard()?;
                let path = path.unwrap_or_else(|| self.export_file.clone());
                let written = table::export_file(&self.view, &path)?;
                return Ok(Outcome::Show(format!(
                    "exported {} rows to {}",
                    written,
                    path.display()
                )));
            }
            command => {
                self.require_dashboard()?;
                self.apply(command).await?;
            }
        }
        Ok(Outcome::Show(self.render()))
    }

    async fn apply(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Search(term) => {
                // the view already carries the error message
                let _ = self.search(&term).await;
            }
            Command::Sort(column) => {
                self.view.toggle_sort(column)?;
            }
            Command::Next => self.view.next_page(),
            Command::Previous => self.view.previous_page(),
            Command::Page(number) => self.view.goto_page(number - 1),
            Command::Size(size) => self.view.set_page_size(size),
            Command::Edit(number) => {
                self.view.begin_edit(number - 1)?;
            }
            Command::Set(column, value) => self.view.commit_cell(column, &value)?,
            Command::Save => {
                self.view.save_edit();
            }
            other => debug!(?other, "not a table command"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::UNKNOWN;
    use crate::config::DEFAULT_QUERY;
    use crate::open_library_api::fake::{book, FakeCatalog};

    fn catalog() -> FakeCatalog {
        FakeCatalog::with_books(vec![
            book("The Lord of the Rings", Some("OL26320A")),
            book("The Lord of the Rings Companion", None),
            book("Bored of the Rings", Some("OL7913A")),
        ])
        .author("OL26320A", "J.R.R. Tolkien", "3 January 1892", "The Hobbit")
        .author("OL7913A", "Henry N. Beard", "1945", "Bored of the Rings")
    }

    fn dashboard(catalog: FakeCatalog) -> Dashboard<FakeCatalog> {
        Dashboard::new(catalog, &Config::default())
    }

    #[test]
    fn commands_parse() {
        assert_eq!("".parse::<Command>().unwrap(), Command::Show);
        assert_eq!(
            "search  the lord of the rings ".parse::<Command>().unwrap(),
            Command::Search("the lord of the rings".to_string())
        );
        assert_eq!("login".parse::<Command>().unwrap(), Command::Login(None));
        assert_eq!(
            "set author_name Alan Lee".parse::<Command>().unwrap(),
            Command::Set(ColumnKey::AuthorName, "Alan Lee".to_string())
        );
        assert_eq!(
            "set title".parse::<Command>().unwrap(),
            Command::Set(ColumnKey::Title, String::new())
        );
        assert_eq!(
            "size 50".parse::<Command>().unwrap(),
            Command::Size(PageSize::new(50).unwrap())
        );
        assert_eq!(
            "export out.csv".parse::<Command>().unwrap(),
            Command::Export(Some(PathBuf::from("out.csv")))
        );
        assert!("page 0".parse::<Command>().is_err());
        assert!("sort isbn".parse::<Command>().is_err());
        assert!("search".parse::<Command>().is_err());
        assert!("fly".parse::<Command>().is_err());
    }

    #[tokio::test]
    async fn dashboard_redirects_until_login() {
        let mut dashboard = dashboard(catalog());
        assert!(!dashboard.session().is_authenticated());

        assert_eq!(dashboard.navigate("/dashboard").await.unwrap(), Page::Login);
        assert!(matches!(
            dashboard.execute(Command::Next).await,
            Err(Error::Unauthorized(_))
        ));
        assert!(dashboard.catalog().searches.lock().unwrap().is_empty());

        assert_eq!(dashboard.login(Some("sam")).await.unwrap(), Page::Dashboard);
        assert!(dashboard.session().is_authenticated());
        assert_eq!(
            dashboard.navigate("/dashboard").await.unwrap(),
            Page::Dashboard
        );
        assert_eq!(
            *dashboard.catalog().searches.lock().unwrap(),
            vec![DEFAULT_QUERY.to_string()]
        );
    }

    #[tokio::test]
    async fn login_loads_the_initial_search() {
        let mut dashboard = dashboard(catalog());
        dashboard.login(None).await.unwrap();

        let view = dashboard.view();
        assert_eq!(view.len(), 3);
        let rows: Vec<_> = view
            .ordered_rows()
            .iter()
            .map(|&id| view.row(id).unwrap())
            .collect();
        assert_eq!(rows[0].author_name, "J.R.R. Tolkien");
        assert_eq!(rows[1].author_name, UNKNOWN);
        assert_eq!(rows[1].author_birth_date, UNKNOWN);
        assert_eq!(rows[1].author_top_work, UNKNOWN);
        assert_eq!(rows[2].author_name, "Henry N. Beard");
        assert!(dashboard.render().contains("Page 1 of 1"));
    }

    #[tokio::test]
    async fn failed_author_lookup_keeps_previous_rows() {
        let mut dashboard = dashboard(catalog());
        dashboard.login(None).await.unwrap();

        dashboard
            .catalog
            .failing_authors
            .insert("OL7913A".to_string());
        let outcome = dashboard
            .execute(Command::Search("bored".to_string()))
            .await
            .unwrap();

        assert_eq!(dashboard.view().len(), 3);
        assert_eq!(dashboard.view().search_term(), "bored");
        match outcome {
            Outcome::Show(text) => assert!(text.contains(crate::view::FETCH_ERROR)),
            Outcome::Quit => panic!("search should not quit"),
        }
    }

    #[tokio::test]
    async fn table_commands_drive_the_view() {
        let mut dashboard = dashboard(catalog());
        dashboard.login(None).await.unwrap();

        dashboard.execute("sort title".parse().unwrap()).await.unwrap();
        dashboard.execute("edit 1".parse().unwrap()).await.unwrap();
        dashboard
            .execute("set author_top_work Fan Parody".parse().unwrap())
            .await
            .unwrap();
        dashboard.execute("save".parse().unwrap()).await.unwrap();

        let view = dashboard.view();
        let first = view.ordered_rows()[0];
        assert_eq!(view.row(first).unwrap().book.title, "Bored of the Rings");
        assert_eq!(view.cell(first, ColumnKey::AuthorTopWork), "Fan Parody");
        assert_eq!(view.editing(), None);

        assert!(matches!(
            dashboard.execute("set title x".parse().unwrap()).await,
            Err(Error::NotEditing)
        ));
        assert_eq!(
            dashboard.execute(Command::Quit).await.unwrap(),
            Outcome::Quit
        );
    }

    #[tokio::test]
    async fn export_writes_the_full_row_set() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.csv");
        let mut dashboard = dashboard(catalog());
        dashboard.login(None).await.unwrap();
        dashboard
            .execute(Command::Size(PageSize::new(10).unwrap()))
            .await
            .unwrap();

        let outcome = dashboard
            .execute(Command::Export(Some(path.clone())))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            Outcome::Show(format!("exported 3 rows to {}", path.display()))
        );
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 4);
    }
}
