//! Graphviz rendering of automata and transducers.
//!
//! Output starts with an invisible `start` node pointing at the start
//! state, followed by the arcs leaving the start state, then every other
//! arc, then one `doublecircle` line per accepting state.
use std::io::{self, Write};

use crate::automaton::Automaton;
use crate::transducer::Transducer;
use crate::types::{StateId, Symbol};

const EPSILON: &str = "ε";

fn label(symbol: Symbol) -> String {
    match symbol {
        Symbol::Epsilon => EPSILON.to_string(),
        Symbol::Char('"') => "\\\"".to_string(),
        Symbol::Char('\\') => "\\\\".to_string(),
        Symbol::Char(c) => c.to_string(),
    }
}

fn write_header<W: Write>(w: &mut W, start: Option<StateId>) -> io::Result<()> {
    writeln!(w, "digraph {{")?;
    writeln!(w, "  rankdir = LR;")?;
    writeln!(w, "  start[style=invis];")?;
    writeln!(w, "  node[shape=circle];")?;
    if let Some(start) = start {
        writeln!(w, "  start -> {};", start)?;
    }
    Ok(())
}

fn write_footer<'a, W, I>(w: &mut W, accepting: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a StateId>,
{
    for state in accepting {
        writeln!(w, "  {} [shape=doublecircle];", state)?;
    }
    writeln!(w, "}}")
}

/// Start-state arcs first, the rest in state order.
fn start_first<T>(mut edges: Vec<(StateId, T)>, start: Option<StateId>) -> Vec<(StateId, T)> {
    edges.sort_by_key(|(from, _)| (Some(*from) != start, *from));
    edges
}

pub fn automaton_to_dot<W: Write>(fsa: &Automaton, mut w: W) -> io::Result<()> {
    write_header(&mut w, fsa.start())?;

    let edges: Vec<(StateId, (StateId, String))> = fsa
        .transitions()
        .map(|(from, sym, to)| (from, (to, label(Symbol::Char(sym)))))
        .collect();
    for (from, (to, label)) in start_first(edges, fsa.start()) {
        writeln!(w, "  {} -> {} [label=\"{}\"];", from, to, label)?;
    }

    write_footer(&mut w, fsa.accepting())
}

pub fn transducer_to_dot<W: Write>(fst: &Transducer, mut w: W) -> io::Result<()> {
    write_header(&mut w, fst.start())?;

    let mut edges: Vec<(StateId, (Symbol, StateId, Symbol, f32))> = fst
        .arcs()
        .map(|(from, input, t)| (from, (input, t.target(), t.symbol(), t.weight().0)))
        .collect();
    edges.sort_by(|(a, x), (b, y)| {
        a.cmp(b)
            .then(x.0.cmp(&y.0))
            .then(x.1.cmp(&y.1))
            .then(x.2.cmp(&y.2))
            .then(x.3.total_cmp(&y.3))
    });

    for (from, (input, to, output, weight)) in start_first(edges, fst.start()) {
        writeln!(
            w,
            "  {} -> {} [label=\"{}:{}/{}\"];",
            from,
            to,
            label(input),
            label(output),
            weight
        )?;
    }

    write_footer(&mut w, fst.accepting())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Weight;

    fn render<F: FnOnce(&mut Vec<u8>) -> io::Result<()>>(f: F) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn automaton_graph() {
        let fsa = Automaton::from_words(&["ab"]);
        let dot = render(|buf| automaton_to_dot(&fsa, buf));

        assert_eq!(
            dot,
            "digraph {\n  rankdir = LR;\n  start[style=invis];\n  node[shape=circle];\n  \
             start -> 0;\n  0 -> 1 [label=\"a\"];\n  1 -> 2 [label=\"b\"];\n  \
             2 [shape=doublecircle];\n}\n"
        );
    }

    #[test]
    fn transducer_graph_starts_at_start_state() {
        let mut fst = Transducer::new();
        fst.set_start(StateId(5));
        fst.add_transition(StateId(1), Symbol::Char('b'), Some(StateId(5)), None, Weight(0.5), false);
        fst.add_transition(
            StateId(5),
            Symbol::Epsilon,
            Some(StateId(1)),
            Some(Symbol::Char('"')),
            Weight(2.0),
            true,
        );

        let dot = render(|buf| transducer_to_dot(&fst, buf));
        let lines: Vec<&str> = dot.lines().collect();

        assert_eq!(lines[4], "  start -> 5;");
        assert_eq!(lines[5], "  5 -> 1 [label=\"ε:\\\"/2\"];");
        assert_eq!(lines[6], "  1 -> 5 [label=\"b:b/0.5\"];");
        assert_eq!(lines[7], "  1 [shape=doublecircle];");
    }
}
