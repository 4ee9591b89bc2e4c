//! Text rendering of an injection plan

use std::fmt::Write;
use tia_runtime::{InjectionPosition, UnitDescriptor};

/// One block per instrumented behavior, in behavior order
pub(crate) fn render(descriptor: &UnitDescriptor) -> String {
    let mut out = String::new();
    let instrumented = descriptor
        .behaviors
        .iter()
        .enumerate()
        .filter(|(index, _)| descriptor.injections_for(*index).next().is_some())
        .count();
    let _ = writeln!(
        out,
        "{}: {instrumented} of {} behaviors instrumented",
        descriptor.name,
        descriptor.behaviors.len()
    );

    for (index, behavior) in descriptor.behaviors.iter().enumerate() {
        let mut injections = descriptor.injections_for(index).peekable();
        if injections.peek().is_none() {
            continue;
        }
        let _ = writeln!(out, "  {}({})", behavior.name, behavior.parameters.join(", "));
        for injection in injections {
            let position = match injection.position {
                InjectionPosition::Before => "before",
                InjectionPosition::After if injection.preserve_return => "after (return preserved)",
                InjectionPosition::After => "after",
            };
            let _ = writeln!(out, "    {position}: {}", injection.snippet);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tia_runtime::{Behavior, CompiledUnit, Injection};

    #[test]
    fn renders_only_instrumented_behaviors() {
        let unit = CompiledUnit::new("acme.Shape")
            .with_behavior(Behavior::method("render").with_parameters(["int"]))
            .with_behavior(Behavior::method("outline").into_abstract());
        let mut descriptor = UnitDescriptor::from(&unit);
        descriptor.injections = vec![
            Injection {
                behavior: 0,
                position: InjectionPosition::Before,
                snippet: "enter();".to_string(),
                preserve_return: false,
            },
            Injection {
                behavior: 0,
                position: InjectionPosition::After,
                snippet: "exit();".to_string(),
                preserve_return: true,
            },
        ];

        assert_eq!(
            render(&descriptor),
            "acme.Shape: 1 of 2 behaviors instrumented\n  \
             render(int)\n    \
             before: enter();\n    \
             after (return preserved): exit();\n"
        );
    }
}
