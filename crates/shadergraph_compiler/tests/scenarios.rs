// SPDX-License-Identifier: MIT OR Apache-2.0
//! End-to-end compile scenarios built against the public API.

use shadergraph_compiler::{
    input_values, CompileOutput, Compiler, CompilerConfig, DiagnosticKind, TranslationUnit,
};
use shadergraph_model::{
    insert_value, Block, CallData, Component, ComponentId, ComponentKind, Connection, Fragment,
    FragmentData, FragmentId, FragmentKind, Function, FunctionKind, GlobalScope, InputRef, Project,
    Statement, StatementKind,
};

/// Insert `float name = value` ahead of the outputs of the entry function
/// and expose it as a property
fn add_property(component: &mut Component, type_name: &str, name: &str, value: &[f32]) -> Fragment {
    let mut line = Function::variable_definition_block(type_name, name);
    if let Some(constant) = line.statement.fragments.first_mut() {
        insert_value(constant, value);
    }
    let variable = line.fragment.clone();
    if let Some(function) = component.functions.last_mut() {
        function.body.insert(0, line);
    }
    component.expose_property(variable.id, name);
    variable
}

/// Replace the right-hand side of the output line named `out`
fn assign_output(component: &mut Component, out: &str, value: Fragment) {
    let line = component
        .functions
        .last_mut()
        .and_then(|f| f.body.iter_mut().find(|b| b.fragment.name == out))
        .expect("output line");
    line.statement = Statement::single(StatementKind::Arithmetic, value);
}

fn circle() -> Component {
    let mut component = Component::new(ComponentKind::SDF2D, "circle");
    component.add_default_function(FunctionKind::SDF2D);
    component
}

fn compile(component: &mut Component) -> CompileOutput {
    Compiler::default()
        .compile(component, &GlobalScope::new())
        .expect("compiles")
}

/// Every `__data[i]` lookup in emission order with the accessor following it
fn lookups(code: &str) -> Vec<(usize, String)> {
    code.match_indices("__data[")
        .map(|(at, pattern)| {
            let rest = &code[at + pattern.len()..];
            let close = rest.find(']').expect("closing bracket");
            let index = rest[..close].parse().expect("numeric index");
            let after = &rest[close + 1..];
            let accessor = if after.starts_with('.') {
                after
                    .chars()
                    .take_while(|c| *c == '.' || c.is_ascii_alphabetic())
                    .collect()
            } else {
                String::new()
            };
            (index, accessor)
        })
        .collect()
}

#[test]
fn test_qualifier_sets_arity() {
    let wide = Fragment::global_reference("float4", "color").with_qualifier("xyz");
    assert_eq!(wide.effective_type(false), "float3");
    assert_eq!(wide.component_count(false), 3);

    let narrow = Fragment::global_reference("float4", "color").with_qualifier("w");
    assert_eq!(narrow.effective_type(false), "float");
    assert_eq!(narrow.component_count(false), 1);
    assert_eq!(narrow.effective_type(true), "float4");
}

#[test]
fn test_radius_property_is_flattened() {
    let mut component = circle();
    let radius = add_property(&mut component, "float", "radius", &[2.0]);
    assign_output(&mut component, "outDistance", Fragment::reference_to(&radius));

    let output = compile(&mut component);
    let declared = component.functions[0].body[0]
        .fragment
        .symbol
        .clone()
        .expect("radius symbol");

    assert_eq!(
        output.local_code(),
        format!("float {declared} = __data[0].x;\noutDistance = {declared};\n")
    );
    assert_eq!(output.inputs(), &[InputRef::Property(radius.id)]);
    assert_eq!(output.code.input_components, vec![component.id]);
    assert!(output.is_clean());

    let values = input_values(&output.code, [&component], &GlobalScope::new()).expect("values");
    assert_eq!(values, vec![[2.0, 0.0, 0.0, 0.0]]);
}

#[test]
fn test_base_offset_shifts_indices() {
    let mut component = circle();
    add_property(&mut component, "float", "radius", &[2.0]);
    let config = CompilerConfig {
        base_offset: 5,
        ..CompilerConfig::default()
    };
    let output = Compiler::new(config)
        .compile(&mut component, &GlobalScope::new())
        .expect("compiles");
    assert_eq!(lookups(output.local_code()), vec![(5, ".x".to_string())]);
}

#[test]
fn test_accessors_follow_bound_order() {
    let mut component = circle();
    let widths = [("float4", 4), ("float2", 2), ("float", 1), ("float3", 3)];
    let mut properties = Vec::new();
    for (index, (type_name, _)) in widths.iter().enumerate() {
        properties.push(add_property(&mut component, type_name, &format!("p{index}"), &[1.0]));
    }

    let output = compile(&mut component);
    assert_eq!(output.code.inputs.len(), output.code.input_components.len());

    let found = lookups(output.local_code());
    assert_eq!(found.len(), output.code.inputs.len());
    for (slot, (index, accessor)) in found.iter().enumerate() {
        assert_eq!(*index, slot);
        let InputRef::Property(id) = output.code.inputs[slot] else {
            panic!("expected a property");
        };
        let property = properties.iter().find(|p| p.id == id).expect("bound property");
        let expected = match property.component_count(false) {
            1 => ".x",
            2 => ".xy",
            3 => ".xyz",
            _ => "",
        };
        assert_eq!(accessor, expected);
    }
}

#[test]
fn test_compile_is_idempotent() {
    let mut component = circle();
    let radius = add_property(&mut component, "float", "radius", &[2.0]);
    add_property(&mut component, "float3", "offset", &[0.0, 1.0, 0.0]);
    assign_output(&mut component, "outDistance", Fragment::reference_to(&radius).negate());

    let mut compiler = Compiler::default();
    let first = compiler
        .compile(&mut component, &GlobalScope::new())
        .expect("first pass");
    let second = compiler
        .compile(&mut component, &GlobalScope::new())
        .expect("second pass");
    assert_eq!(first.local_code(), second.local_code());
    assert_eq!(first.global_code(), second.global_code());
    assert_eq!(first.inputs(), second.inputs());
}

#[test]
fn test_symbol_stable_within_scope() {
    let mut component = circle();
    let mut line = Function::variable_definition_block("float", "scale");
    let scale = line.fragment.clone();
    line.statement = Statement::single(StatementKind::Arithmetic, Fragment::constant("float", 3.0));
    component.functions[0].body.insert(0, line);

    let product = Statement::new(StatementKind::Arithmetic)
        .with(Fragment::reference_to(&scale))
        .with(Fragment::operator(FragmentKind::Arithmetic, "*"))
        .with(Fragment::reference_to(&scale));
    if let Some(out) = component.functions[0].body.last_mut() {
        out.statement = product;
    }

    let output = compile(&mut component);
    let symbol = component.functions[0].body[0]
        .fragment
        .symbol
        .clone()
        .expect("symbol");
    assert_eq!(
        output.local_code(),
        format!("float {symbol} = 3.000;\noutDistance = {symbol} * {symbol};\n")
    );
    assert_eq!(component.functions[0].body[0].fragment.references, 2);
}

#[test]
fn test_unresolved_reference_becomes_default() {
    let mut component = circle();
    let ghost = Fragment::variable("float2", "ghost");
    let reference = Fragment::reference_to(&ghost).with_qualifier("y");
    let reference_id = reference.id;
    assign_output(&mut component, "outDistance", reference);

    let output = compile(&mut component);
    assert_eq!(output.local_code(), "outDistance = float2(0.000, 0.000).y;\n");
    assert_eq!(output.diagnostics.len(), 1);
    assert_eq!(output.diagnostics[0].fragment, Some(reference_id));
    assert!(matches!(
        output.diagnostics[0].kind,
        DiagnosticKind::UnresolvedVariable { .. }
    ));

    let substituted = &component.functions[0].body[1].statement.fragments[0];
    assert_eq!(substituted.id, reference_id);
    assert_eq!(substituted.kind, FragmentKind::ConstantDefinition);
    assert!(substituted.unresolved);

    let again = compile(&mut component);
    assert_eq!(again.local_code(), output.local_code());
    assert!(again.is_clean());
}

#[test]
fn test_unresolved_negated_reference_keeps_sign() {
    let mut component = circle();
    let ghost = Fragment::variable("float2", "ghost");
    let reference = Fragment::reference_to(&ghost).with_qualifier("x").negate();
    assign_output(&mut component, "outDistance", reference);

    let output = compile(&mut component);
    assert_eq!(output.local_code(), "outDistance = -float2(0.000, 0.000).x;\n");
    let substituted = &component.functions[0].body[1].statement.fragments[0];
    assert!(substituted.negated);
    assert_eq!(substituted.qualifier, "x");
}

#[test]
fn test_unresolved_assignment_target_is_declared() {
    let mut component = circle();
    let ghost = Fragment::variable("float", "ghost");
    let line = Block::line(
        Fragment::reference_to(&ghost),
        Statement::single(StatementKind::Arithmetic, Fragment::constant("float", 1.0)),
    );
    component.functions[0].body.insert(0, line);

    let output = compile(&mut component);
    let placeholder = &component.functions[0].body[0].fragment;
    let symbol = placeholder.symbol.clone().expect("placeholder symbol");
    assert!(output
        .local_code()
        .starts_with(&format!("float {symbol} = 1.000;\n")));
    assert!(placeholder.unresolved);
    assert!(!placeholder.flags.selectable);
    assert!(matches!(
        output.diagnostics[0].kind,
        DiagnosticKind::PlaceholderDeclaration { .. }
    ));
}

#[test]
fn test_global_variable_lookup() {
    let exposure = Component::variable("exposure", "float", "Exposure", &[1.5]);
    let globals = GlobalScope::from_components([&exposure]);

    let mut component = circle();
    assign_output(
        &mut component,
        "outDistance",
        Fragment::global_reference("float", "exposure"),
    );
    let output = Compiler::default()
        .compile(&mut component, &globals)
        .expect("compiles");

    assert_eq!(output.local_code(), "outDistance = __data[0].x;\n");
    assert_eq!(output.inputs(), &[InputRef::GlobalVariable(exposure.id)]);
    assert_eq!(output.code.input_components, vec![component.id]);
    let values = input_values(&output.code, [&component], &globals).expect("values");
    assert_eq!(values, vec![[1.5, 0.0, 0.0, 0.0]]);
}

#[test]
fn test_free_flow_call_passes_context() {
    let mut project = Project::new("Calls");
    let mut library = Component::new(ComponentKind::FunctionContainer, "library");
    let helper = library.add_function("helper");
    let call = library.functions[0].call();
    project.add_component(library);

    let mut component = circle();
    assign_output(&mut component, "outDistance", call.with_qualifier("x"));
    let target = project.add_component(component);

    let mut compiler = Compiler::default();
    let output = compiler
        .compile_in_project(&mut project, target)
        .expect("compiles");
    let library = project.component_by_name("library").expect("library");
    let symbol = library.functions[0].symbol.clone().expect("helper symbol");

    assert_eq!(output.local_code(), format!("outDistance = {symbol}(__funcData).x;\n"));
    assert!(output
        .global_code()
        .starts_with(&format!("float4 {symbol}(thread FuncData *__funcData) {{\n")));
    assert!(output.global_code().ends_with("return out;\n}\n"));
    assert_eq!(compiler.function_references(helper), 1);
}

#[test]
fn test_if_block_braces_children() {
    let mut component = circle();
    let first = Block::line(
        Fragment::variable("float", "a"),
        Statement::single(StatementKind::Arithmetic, Fragment::constant("float", 1.0)),
    );
    let second = Block::line(
        Fragment::variable("float", "b"),
        Statement::single(StatementKind::Arithmetic, Fragment::constant("float", 2.0)),
    );
    let condition = Statement::new(StatementKind::Boolean)
        .with(Fragment::constant("float", 1.0))
        .with(Fragment::operator(FragmentKind::Comparison, ">"))
        .with(Fragment::constant("float", 0.0));
    component.functions[0]
        .body
        .insert(1, Block::if_block(condition, vec![first, second]));

    let output = compile(&mut component);
    let code = output.local_code();
    let open = code.find("if (1.000 > 0.000) {\n").expect("if header");
    let a = code.find(" = 1.000;\n").expect("first child");
    let b = code.find(" = 2.000;\n").expect("second child");
    let close = code[b..].find("}\n").map(|at| at + b).expect("closing brace");
    assert!(open < a && a < b && b < close);
    assert_eq!(code.matches('{').count(), 1);
    assert_eq!(code.matches('}').count(), 1);
}

fn pattern(name: &str) -> Component {
    let mut component = Component::new(ComponentKind::Pattern, name);
    component.add_default_function(FunctionKind::Pattern);
    component
}

fn material() -> Component {
    let mut component = Component::new(ComponentKind::Material3D, "metal");
    component.add_default_function(FunctionKind::Material3D);
    component
}

/// Feed a new float4 property of `consumer` from a terminal of `source`
fn feed(consumer: &mut Component, source: ComponentId, terminal: &str) -> FragmentId {
    let property = add_property(consumer, "float4", "input", &[0.5, 0.5, 0.5, 1.0]);
    consumer.connect(property.id, Connection::new(source, terminal));
    property.id
}

#[test]
fn test_pattern_color_is_mixed() {
    let stripes = pattern("stripes");
    let mut metal = material();
    let tint = feed(&mut metal, stripes.id, "color");
    let mut patterns = vec![stripes];

    let output = Compiler::default()
        .compile_with_patterns(&mut metal, &mut patterns, &GlobalScope::new())
        .expect("compiles");
    let entry = patterns[0].functions[0].symbol.clone().expect("entry symbol");
    let binding = output.code.pattern_bindings.get(&tint).expect("binding");
    let token = &binding.token;

    assert_eq!(binding.entry, entry);
    assert!(output.global_code().starts_with(&format!("void {entry}(float2 uv,")));
    assert_eq!(output.global_code().matches(&format!("void {entry}(")).count(), 2);
    assert!(output.local_code().starts_with(&format!(
        "PatternOut {token};\n{entry}(uv, localPosition, hitNormal, rayOrigin, incomingDirection, &{token}, __funcData);\n"
    )));
    assert!(output.local_code().contains(&format!(
        " = mix(__funcData->__data[0], {token}.color, {token}.color.w);\n"
    )));
    assert_eq!(output.inputs(), &[InputRef::Property(tint)]);
    assert!(output.is_clean());

    let unit = TranslationUnit::assemble(&output, &CompilerConfig::default());
    assert!(unit.source.contains("struct PatternOut {"));
    assert!(!unit.source.contains("__CREATE_TEXTURE_DEFINITIONS__"));
}

#[test]
fn test_pattern_terminal_is_read() {
    let stripes = pattern("stripes");
    let mut metal = material();
    let mask = feed(&mut metal, stripes.id, "mask");
    let mut patterns = vec![stripes];

    let output = Compiler::default()
        .compile_with_patterns(&mut metal, &mut patterns, &GlobalScope::new())
        .expect("compiles");
    let token = &output.code.pattern_bindings[&mask].token;
    assert!(output.local_code().contains(&format!(" = {token}.mask;\n")));
    assert!(output.inputs().is_empty());
}

#[test]
fn test_dangling_connection_falls_back_to_buffer() {
    let mut metal = material();
    let property = feed(&mut metal, ComponentId::new(), "color");
    let mut patterns = vec![pattern("unrelated")];

    let output = Compiler::default()
        .compile_with_patterns(&mut metal, &mut patterns, &GlobalScope::new())
        .expect("compiles");
    assert!(output.global_code().is_empty());
    assert_eq!(output.inputs(), &[InputRef::Property(property)]);
    assert!(matches!(
        output.diagnostics[0].kind,
        DiagnosticKind::DanglingConnection { .. }
    ));
}

#[test]
fn test_pattern_cycle_compiles_once_each() {
    let mut a = pattern("a");
    let mut b = pattern("b");
    feed(&mut a, b.id, "color");
    feed(&mut b, a.id, "mask");
    let mut metal = material();
    feed(&mut metal, a.id, "color");
    let a_id = a.id;
    let mut patterns = vec![a, b];

    let mut compiler = Compiler::default();
    let first = compiler
        .compile_with_patterns(&mut metal, &mut patterns, &GlobalScope::new())
        .expect("compiles");
    let second = compiler
        .compile_with_patterns(&mut metal, &mut patterns, &GlobalScope::new())
        .expect("compiles again");

    let entry_a = patterns[0].functions[0].symbol.clone().expect("entry a");
    let entry_b = patterns[1].functions[0].symbol.clone().expect("entry b");
    let wrapper = |entry: &str| {
        first
            .global_code()
            .lines()
            .position(|l| l.starts_with(&format!("void {entry}(")) && l.ends_with(") {"))
            .expect("wrapper")
    };
    assert!(wrapper(&entry_b) < wrapper(&entry_a));

    for entry in [&entry_a, &entry_b] {
        assert_eq!(first.global_code().matches(&format!("void {entry}(")).count(), 2);
    }
    assert!(first
        .diagnostics
        .iter()
        .any(|d| d.kind == DiagnosticKind::PatternCycle { pattern: a_id }));
    assert_eq!(first.global_code(), second.global_code());
    assert_eq!(first.local_code(), second.local_code());
    assert_eq!(first.inputs(), second.inputs());
    assert_eq!(first.code.input_components, vec![a_id, metal.id]);
}

#[test]
fn test_prototype_resolves_without_body() {
    let mut library = Component::new(ComponentKind::FunctionContainer, "library");
    let prototype = Function::new(FunctionKind::Prototype, "noise");
    let call = prototype.call();
    library.push_function(prototype.with_line(Block::empty()));

    let mut component = circle();
    assign_output(&mut component, "outDistance", call);

    let mut compiler = Compiler::default();
    let globals = GlobalScope::new();
    let library_output = compiler.compile(&mut library, &globals).expect("library");
    let output = compiler.compile(&mut component, &globals).expect("component");

    assert!(library_output.global_code().is_empty());
    assert_eq!(output.local_code(), "outDistance = noise(__funcData);\n");
    assert!(output.is_clean());
}

#[test]
fn test_texture_definitions_are_assembled() {
    let mut library = Component::new(ComponentKind::FunctionContainer, "library");
    library.add_function("sample");
    let mut image = Fragment::primitive("float4", "Bricks");
    image.data = FragmentData::Call(CallData {
        is_image: true,
        needs_context: false,
    });
    let uv = Fragment::constant("float", 0.5);
    let image = image.with_argument(Statement::single(StatementKind::Arithmetic, uv));
    let function = &mut library.functions[0];
    let out = function.out_variable_block("float4", "out", None);
    function.body.push(out);
    if let Some(line) = function.body.last_mut() {
        line.statement = Statement::single(StatementKind::Arithmetic, image);
    }

    let output = compile(&mut library);
    let texture = output.code.textures.first().expect("texture").clone();
    assert_eq!(texture.name, "Bricks");
    assert!(output
        .global_code()
        .contains(&format!("out = __interpolateTexture({}, 0.500);\n", texture.token)));

    let unit = TranslationUnit::assemble(&output, &CompilerConfig::default());
    assert!(unit.source.contains(&format!(
        "texture2d<half, access::sample> {0} = __funcData->{0};\n",
        texture.token
    )));
}

#[test]
fn test_property_value_keeps_texture() {
    let mut component = circle();
    let mut wood = Fragment::primitive("float4", "wood");
    wood.data = FragmentData::Call(CallData {
        is_image: true,
        needs_context: false,
    });
    let uv = Fragment::constant("float", 0.25);
    let wood = wood.with_argument(Statement::single(StatementKind::Arithmetic, uv));
    let grain = add_property(&mut component, "float4", "grain", &[0.0]);
    component.functions[0].body[0].statement = Statement::single(StatementKind::Arithmetic, wood);

    let output = compile(&mut component);
    let texture = output.code.textures.first().expect("texture").clone();
    assert_eq!(texture.name, "wood");
    assert!(output
        .local_code()
        .starts_with(&format!("float4 {} = __data[0];\n", grain_symbol(&component, grain.id))));
    assert!(!output.local_code().contains("__interpolateTexture"));

    let unit = TranslationUnit::assemble(&output, &CompilerConfig::default());
    assert!(unit
        .source
        .contains(&format!("texture2d<half, access::sample> {};\n", texture.token)));
}

fn grain_symbol(component: &Component, property: FragmentId) -> String {
    component
        .property_block(property)
        .and_then(|b| b.fragment.symbol.clone())
        .expect("property symbol")
}
