//! 目录树文本渲染

use super::types::FileNode;

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE: &str = "│   ";
const SPACE: &str = "    ";

/// 渲染目录树，每个条目一行，不包含根目录本身
pub fn render_tree(root: &FileNode) -> String {
    let mut lines = Vec::new();
    render_children(root, "", &mut lines);
    lines.join("\n")
}

fn render_children(node: &FileNode, prefix: &str, lines: &mut Vec<String>) {
    let count = node.children.len();
    for (index, child) in node.children.iter().enumerate() {
        let is_last = index + 1 == count;
        let connector = if is_last { LAST_BRANCH } else { BRANCH };
        lines.push(format!("{}{}{}", prefix, connector, child.name));

        if !child.is_file {
            let extension = if is_last { SPACE } else { PIPE };
            render_children(child, &format!("{}{}", prefix, extension), lines);
        }
    }
}
