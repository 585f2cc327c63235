//! XTK serializer: turn an imported [`SceneTree`] into a standalone HTML page.

use itertools::Itertools;
use tracing::{instrument, trace};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{SceneTree, TraversalMode, TreeNode, Viewport};
use crate::infrastructure::traits::SceneSource;

pub const DEFAULT_TITLE: &str = "WebGL Export";
pub const DEFAULT_SCRIPT_URL: &str = "http://goXTK.com/xtk.js";

const INDENT: &str = "        ";

const HEADER: &str = r#"<html>
<!-- WebGL Export powered by XTK -- http://goXTK.com -->
  <head>
    <title>{{title}}</title>
    <script type="text/javascript" src="{{script_url}}"></script>
    <script type="text/javascript">
      var run = function() {
        var r = new X.renderer('r');
        r.init();


"#;

const FOOTER: &str = r#"

        r.add(scene);

        r.camera().setPosition{{camera_position}};

        r.render();
      };
    </script>
  </head>
  <body onload="run()">
    <div id="r" style="background-color: {{background_color}}; width: 100%; height: 100%;"></div>
  </body>
</html>
"#;

/// Emits XTK statements for every node of a tree.
#[derive(Debug, Clone)]
pub struct XtkSerializer {
    title: String,
    script_url: String,
}

impl Default for XtkSerializer {
    fn default() -> Self {
        Self::new(DEFAULT_TITLE, DEFAULT_SCRIPT_URL)
    }
}

impl XtkSerializer {
    pub fn new(title: &str, script_url: &str) -> Self {
        Self {
            title: title.to_string(),
            script_url: script_url.to_string(),
        }
    }

    /// Full document: header, one block per node, footer.
    #[instrument(level = "debug", skip_all)]
    pub fn serialize(
        &self,
        tree: &SceneTree,
        source: &dyn SceneSource,
        viewport: &Viewport,
    ) -> ApplicationResult<String> {
        let mut output = self.header();
        output.push_str(&self.statements(tree, source)?);
        output.push_str(&Self::footer(viewport));
        Ok(output)
    }

    pub fn header(&self) -> String {
        let title = escape_html(&self.title);
        let script_url = escape_html(&self.script_url);
        fill_template(
            HEADER,
            &[("title", title.as_str()), ("script_url", script_url.as_str())],
        )
    }

    /// Renderer configuration: camera position and background color.
    pub fn footer(viewport: &Viewport) -> String {
        let camera = format_tuple(&viewport.camera_position);
        let background = escape_html(&viewport.background);
        fill_template(
            FOOTER,
            &[
                ("camera_position", camera.as_str()),
                ("background_color", background.as_str()),
            ],
        )
    }

    /// Statements for the whole tree, parents before children.
    ///
    /// Model attributes are read from `source` now, not at import time.
    pub fn statements(&self, tree: &SceneTree, source: &dyn SceneSource) -> ApplicationResult<String> {
        let root = tree
            .root()
            .ok_or_else(|| ApplicationError::host_query("scene", "root node"))?;

        let mut output = String::new();
        for id in tree.traverse(root.identifier(), TraversalMode::DepthFirst)? {
            let node = tree.get(id)?;
            self.emit(&mut output, node, source)?;
        }
        Ok(output)
    }

    fn emit(&self, out: &mut String, node: &TreeNode, source: &dyn SceneSource) -> ApplicationResult<()> {
        let id = node.identifier();
        trace!("emit {}", id);
        out.push_str(&format!("{INDENT}{id} = new X.object();\n"));

        let Some(parent) = node.parent() else {
            return Ok(());
        };

        let scene_node = source
            .node_by_id(id)
            .ok_or_else(|| ApplicationError::host_query(id, "scene node"))?;
        if scene_node.is_model() {
            let file = source
                .storage_file(id)
                .ok_or_else(|| ApplicationError::host_query(id, "storage node"))?;
            let display = source
                .display_properties(id)
                .ok_or_else(|| ApplicationError::host_query(id, "display node"))?;

            out.push_str(&format!("{INDENT}{id}.load('{}');\n", escape_js(&file)));
            out.push_str(&format!("{INDENT}{id}.setColor{};\n", format_tuple(&display.color)));
            out.push_str(&format!("{INDENT}{id}.setOpacity({});\n", format_float(display.opacity)));
            out.push_str(&format!("{INDENT}{id}.setVisible({});\n", display.visible));
        }

        out.push_str(&format!("{INDENT}{parent}.children().push({id});\n\n"));
        Ok(())
    }
}

/// Shortest round-trip form, always with a fractional part: `1.0`, `0.25`.
pub fn format_float(value: f64) -> String {
    format!("{:?}", value)
}

/// `(x, y, z)`
pub fn format_tuple(values: &[f64]) -> String {
    format!("({})", values.iter().map(|v| format_float(*v)).join(", "))
}

/// Replace `{{slot}}` markers in a single pass. Substituted text is not
/// scanned again; unknown markers are kept as they are.
fn fill_template(template: &str, slots: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let marker = &rest[start..];
        let Some(end) = marker.find("}}") else {
            out.push_str(marker);
            return out;
        };
        let key = &marker[2..end];
        match slots.iter().find(|(slot, _)| *slot == key) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&marker[..end + 2]),
        }
        rest = &marker[end + 2..];
    }
    out.push_str(rest);
    out
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn escape_js(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}
