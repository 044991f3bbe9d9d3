use anyhow::{Context, Result, anyhow, bail};
use editable_config::Config;
use editable_engine::{
    Align, ColumnPosition, Editor, HistoryOptions, NodeData, NodeKind, Outline, RowPosition,
    TableTarget, TextStyle, Tree,
};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::{env, fs, io, process};

/// One line of an editing script
#[derive(Debug, Clone, PartialEq)]
enum Command {
    Select(usize, usize),
    Cursor(usize),
    Insert(String),
    Delete,
    Break,
    Newline,
    Format(Vec<TextStyle>),
    Unformat(Vec<TextStyle>),
    Toggle(TextStyle),
    Link(String),
    Unlink,
    Indent,
    Outdent,
    List(NodeKind),
    Quote,
    Align(Align),
    Table(usize, usize),
    Row(RowPosition),
    Column(ColumnPosition),
    Drop(TableTarget),
    Copy,
    Paste,
    Undo,
    Redo,
    Print,
    Save(Option<PathBuf>),
}

impl Command {
    /// Parses a script line; blank lines and `#` comments yield `None`
    fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim_end();
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            return Ok(None);
        }
        let (name, rest) = line.trim_start().split_once(' ').unwrap_or((line.trim_start(), ""));
        let args: Vec<&str> = rest.split_whitespace().collect();

        let command = match name {
            "select" => match args[..] {
                [a, b] => Command::Select(a.parse()?, b.parse()?),
                _ => bail!("usage: select <start> <end>"),
            },
            "cursor" => match args[..] {
                [a] => Command::Cursor(a.parse()?),
                _ => bail!("usage: cursor <offset>"),
            },
            "insert" if !rest.is_empty() => Command::Insert(rest.to_string()),
            "insert" => bail!("usage: insert <text>"),
            "delete" => Command::Delete,
            "break" => Command::Break,
            "newline" => Command::Newline,
            "format" => Command::Format(parse_styles(&args)?),
            "unformat" => Command::Unformat(parse_styles(&args)?),
            "toggle" => match args[..] {
                [style] => Command::Toggle(style.parse()?),
                _ => bail!("usage: toggle <style>"),
            },
            "link" => match args[..] {
                [url] => Command::Link(url.to_string()),
                _ => bail!("usage: link <url>"),
            },
            "unlink" => Command::Unlink,
            "indent" => Command::Indent,
            "outdent" => Command::Outdent,
            "list" => match args[..] {
                ["bulleted"] => Command::List(NodeKind::Bulleted),
                ["numbered"] => Command::List(NodeKind::Numbered),
                _ => bail!("usage: list bulleted|numbered"),
            },
            "quote" => Command::Quote,
            "align" => match args[..] {
                [align] => Command::Align(align.parse()?),
                _ => bail!("usage: align left|center|right|justify"),
            },
            "table" => match args[..] {
                [rows, cols] => Command::Table(rows.parse()?, cols.parse()?),
                _ => bail!("usage: table <rows> <cols>"),
            },
            "row" => match args[..] {
                [position] => Command::Row(position.parse()?),
                _ => bail!("usage: row above|below"),
            },
            "column" => match args[..] {
                [position] => Command::Column(position.parse()?),
                _ => bail!("usage: column left|right"),
            },
            "drop" => match args[..] {
                [target] => Command::Drop(target.parse()?),
                _ => bail!("usage: drop row|column|table"),
            },
            "copy" => Command::Copy,
            "paste" => Command::Paste,
            "undo" => Command::Undo,
            "redo" => Command::Redo,
            "print" => Command::Print,
            "save" => match args[..] {
                [] => Command::Save(None),
                [path] => Command::Save(Some(PathBuf::from(path))),
                _ => bail!("usage: save [path]"),
            },
            other => bail!("unknown command: {other}"),
        };
        Ok(Some(command))
    }
}

fn parse_styles(args: &[&str]) -> Result<Vec<TextStyle>> {
    if args.is_empty() {
        bail!("expected at least one style");
    }
    args.iter()
        .map(|s| s.parse().map_err(anyhow::Error::from))
        .collect()
}

/// A document being edited by a script
struct Session {
    editor: Editor,
    path: PathBuf,
    clipboard: Option<NodeData>,
}

impl Session {
    fn open(path: PathBuf, history: HistoryOptions) -> Result<Self> {
        let tree = if path.exists() {
            let bytes = fs::read(&path)
                .with_context(|| format!("Failed to read document {}", path.display()))?;
            Tree::from_bytes(&bytes)
                .with_context(|| format!("Failed to load document {}", path.display()))?
        } else {
            log::info!("{} does not exist, starting an empty document", path.display());
            Tree::new()
        };
        let mut editor = Editor::with_history(tree, history);
        // Scripts start where the document was last saved, else at its start
        editor.restore();
        if !editor.is_valid() {
            editor.reset();
        }
        Ok(Self {
            editor,
            path,
            clipboard: None,
        })
    }

    fn run(&mut self, command: Command, out: &mut impl Write) -> Result<()> {
        log::debug!("running {command:?}");
        let editor = &mut self.editor;
        match command {
            Command::Select(start, end) => {
                editor.select_offsets(start, end);
            }
            Command::Cursor(at) => {
                editor.select_offsets(at, at);
            }
            Command::Insert(text) => {
                editor.insert(&text);
            }
            Command::Delete => {
                editor.delete();
            }
            Command::Break => {
                editor.break_line(false);
            }
            Command::Newline => {
                editor.break_line(true);
            }
            Command::Format(styles) => {
                editor.format(&styles, false);
            }
            Command::Unformat(styles) => {
                editor.format(&styles, true);
            }
            Command::Toggle(style) => {
                editor.toggle_format(style);
            }
            Command::Link(url) => {
                editor.link(Some(&url));
            }
            Command::Unlink => {
                editor.unlink();
            }
            Command::Indent => {
                editor.indent();
            }
            Command::Outdent => {
                editor.outdent();
            }
            Command::List(kind) => {
                editor.toggle_list(kind);
            }
            Command::Quote => {
                editor.toggle_quote();
            }
            Command::Align(align) => {
                editor.set_align(align);
            }
            Command::Table(rows, cols) => {
                editor.table_new(rows, cols);
            }
            Command::Row(position) => {
                editor.table_row(position);
            }
            Command::Column(position) => {
                editor.table_column(position);
            }
            Command::Drop(target) => {
                editor.table_delete(target);
            }
            Command::Copy => {
                self.clipboard = editor.copy();
                if self.clipboard.is_none() {
                    log::warn!("nothing to copy");
                }
            }
            Command::Paste => match &self.clipboard {
                Some(fragment) => {
                    editor.paste(fragment);
                }
                None => log::warn!("clipboard is empty"),
            },
            Command::Undo => {
                editor.undo();
            }
            Command::Redo => {
                editor.redo();
            }
            Command::Print => writeln!(out, "{}", Outline(editor.tree()))?,
            Command::Save(path) => {
                let path = path.unwrap_or_else(|| self.path.clone());
                self.save(&path)?;
            }
        }
        Ok(())
    }

    fn save(&mut self, path: &Path) -> Result<()> {
        let json = self.editor.document().to_json()?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        log::info!("saved {}", path.display());
        Ok(())
    }

    fn run_script(&mut self, script: impl BufRead, out: &mut impl Write) -> Result<()> {
        for (index, line) in script.lines().enumerate() {
            let line = line?;
            let number = index + 1;
            let command = Command::parse(&line)
                .with_context(|| format!("line {number}: {}", line.trim()))?;
            if let Some(command) = command {
                self.run(command, out)
                    .with_context(|| format!("line {number}: {}", line.trim()))?;
            }
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: {} <document.json> [script]", args[0]);
        process::exit(1);
    }

    let config = match Config::load() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };
    let history = HistoryOptions {
        debounce: config.history.debounce(),
        limit: config.history.limit,
    };

    let path = config.resolve_document(Path::new(&args[1]));
    let mut session = Session::open(path, history)?;
    let mut stdout = io::stdout().lock();
    match args.get(2) {
        Some(script) => {
            let file = fs::File::open(script)
                .map_err(|e| anyhow!("Failed to open script {script}: {e}"))?;
            session.run_script(BufReader::new(file), &mut stdout)
        }
        None => session.run_script(io::stdin().lock(), &mut stdout),
    }
}
