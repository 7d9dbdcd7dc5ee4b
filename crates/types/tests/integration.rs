//! Integration tests for types

#[cfg(test)]
mod tests {
    use cellar_types::*;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn definition(name: &str, url: &str) -> PackageDefinition {
        PackageDefinition::new(name).with_url(url)
    }

    #[test]
    fn test_embedded_dependency_reports_spec_name() {
        let inner = PackageSpec::from_definition(
            definition("libfoo", "https://example.org/libfoo-0.3.tar.gz"),
            SpecRequest::Stable,
        )
        .unwrap();
        let dep = Dependency::embedded(Arc::new(inner));
        assert_eq!(dep.name(), "libfoo");
        assert_eq!(dep.target, PackageRef::Name("libfoo".to_string()));
    }

    #[test]
    fn test_patch_declaration_serializes() {
        let decl = PatchDeclaration::ByStrip(vec![
            (StripLevel::P0, vec![PatchSource::location("a.diff")]),
            (
                StripLevel::P1,
                vec![PatchSource::Embedded("--- a\n+++ b\n".to_string())],
            ),
        ]);
        let json = serde_json::to_string(&decl).unwrap();
        let back: PatchDeclaration = serde_json::from_str(&json).unwrap();
        assert_eq!(back, decl);
    }

    #[test]
    fn test_source_options_flow_into_active_spec() {
        let mut def = PackageDefinition::new("tool");
        def.head = Some(SourceDeclaration::new("https://example.org/tool.git").with_option("branch", "main"));
        let spec = PackageSpec::from_definition(def, SpecRequest::Head).unwrap();
        assert_eq!(spec.active().options.get("branch").map(String::as_str), Some("main"));
        assert_eq!(spec.active().variant, SpecVariant::Head);
        assert_eq!(spec.version().to_string(), "HEAD");
    }

    #[test]
    fn test_fails_with_annotation_survives_resolution() {
        let data = BTreeMap::from([("build".to_string(), "2335".to_string())]);
        let def = definition("gmp", "https://example.org/gmp-5.0.2.tar.bz2")
            .with_fails_with(CompilerIncompatibility::llvm(Some("breaks the test suite"), data));
        let spec = PackageSpec::from_definition(def, SpecRequest::Stable).unwrap();
        let record = spec.fails_with().unwrap();
        assert_eq!(record.compiler, Compiler::Llvm);
        assert_eq!(record.build, Some(2335));
    }

    #[test]
    fn test_validate_accepts_resolved_spec() {
        let spec = PackageSpec::from_definition(
            definition("zlib", "https://zlib.net/zlib-1.2.5.tar.gz"),
            SpecRequest::Stable,
        )
        .unwrap();
        assert!(spec.validate().is_ok());
        assert_eq!(spec.version().as_str(), "1.2.5");
    }
}
