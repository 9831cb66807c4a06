//! A thin read-eval-print loop: no design content beyond wiring the three
//! subsystems together and printing what comes out, per the original
//! interpreter's `repl.Start`.
use std::io::{BufRead, Write};
use std::rc::Rc;

use crate::builtins::Io;
use crate::environment::Environment;
use crate::eval_source_in;

const PROMPT: &str = ">> ";

/// Run the REPL until the input stream hits EOF. Bindings persist across
/// lines within one call (a fresh [`Environment`] per call).
pub fn start(reader: &mut dyn BufRead, writer: &mut dyn Write) {
    let env = Environment::new();
    let mut line = String::new();

    loop {
        let _ = write!(writer, "{PROMPT}");
        let _ = writer.flush();

        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) | Err(_) => return,
            Ok(_) => {}
        }

        let mut io = Io {
            out: &mut *writer,
            input: &mut *reader,
        };
        let (value, errors) = eval_source_in(&line, &env, &mut io);
        if !errors.is_empty() {
            for error in errors {
                let _ = writeln!(io.out, "{error}");
            }
            continue;
        }
        let _ = writeln!(io.out, "{}", value.inspect());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn echoes_inspect_of_each_line_result() {
        let mut input = Cursor::new(b"1 + 1\nprintln(\"hi\")\n".to_vec());
        let mut output = Vec::new();
        start(&mut input, &mut output);
        let rendered = String::from_utf8(output).unwrap();
        assert!(rendered.contains("2"));
        assert!(rendered.contains("hi"));
    }

    #[test]
    fn reports_parse_errors_without_stopping() {
        let mut input = Cursor::new(b"var x = ;\n1 + 1\n".to_vec());
        let mut output = Vec::new();
        start(&mut input, &mut output);
        let rendered = String::from_utf8(output).unwrap();
        assert!(rendered.contains("2"));
    }
}
