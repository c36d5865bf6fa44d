//! Console seam: WRITE and INPUT go through this trait so the engine can
//! be driven from tests with scripted I/O.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

/// Line-oriented console access.
pub trait Console {
    /// Writes one line followed by a newline.
    fn write_line(&mut self, text: &str) -> io::Result<()>;

    /// Reads one line, without its trailing newline.
    fn read_line(&mut self) -> io::Result<String>;
}

/// Console over the process's standard streams.
#[derive(Debug, Default)]
pub struct StdConsole;

impl Console for StdConsole {
    fn write_line(&mut self, text: &str) -> io::Result<()> {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        writeln!(lock, "{text}")
    }

    fn read_line(&mut self) -> io::Result<String> {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(line)
    }
}

/// Shared handle to a [`BufferConsole`]'s captured output lines.
pub type OutputHandle = Rc<RefCell<Vec<String>>>;

/// Console with scripted input and captured output.
#[derive(Debug)]
pub struct BufferConsole {
    input: VecDeque<String>,
    output: OutputHandle,
}

impl BufferConsole {
    /// Creates a console fed by `inputs`; the returned handle observes
    /// everything written.
    pub fn new<I, S>(inputs: I) -> (Self, OutputHandle)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let output: OutputHandle = Rc::default();
        let console = Self {
            input: inputs.into_iter().map(Into::into).collect(),
            output: Rc::clone(&output),
        };
        (console, output)
    }
}

impl Console for BufferConsole {
    fn write_line(&mut self, text: &str) -> io::Result<()> {
        self.output.borrow_mut().push(text.to_string());
        Ok(())
    }

    fn read_line(&mut self) -> io::Result<String> {
        self.input.pop_front().ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "scripted input exhausted")
        })
    }
}
