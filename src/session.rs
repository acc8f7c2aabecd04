use std::sync::Arc;

use crate::camera::{OrbitAnchor, PerspectiveCamera};
use crate::geometry::{GeometryId, TextGeometry};
use crate::math::Aabb;
use crate::params::{MaterialParams, TextParams, UpdateKind};
use crate::scene::{Material, MeshId, SceneState, TextMesh};
use crate::texture::TextureHandle;
use crate::viewfit::fit_view;

/// Monotonic ticket number for one regeneration request. Only the most
/// recently issued token may commit; everything older is superseded.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegenToken(u64);

/// Snapshot of one regeneration request: the token plus the parameters the
/// geometry must be built from. Building happens outside the session, so
/// slow font loads never hold the session borrow.
#[derive(Clone, Debug)]
pub struct RegenTicket {
    token: RegenToken,
    pub text: TextParams,
    pub material: MaterialParams,
}

impl RegenTicket {
    pub fn token(&self) -> RegenToken {
        self.token
    }
}

/// Lightweight description of the attached mesh, safe to hold after the
/// session moves on.
#[derive(Copy, Clone, Debug)]
pub struct MeshHandle {
    pub mesh: MeshId,
    pub geometry: GeometryId,
    pub vertices: usize,
    pub triangles: usize,
    pub bounds: Aabb,
}

impl MeshHandle {
    fn of(mesh: &TextMesh) -> MeshHandle {
        MeshHandle {
            mesh: mesh.id,
            geometry: mesh.geometry.id(),
            vertices: mesh.geometry.vertex_count(),
            triangles: mesh.geometry.triangle_count(),
            bounds: mesh.world_bounds(),
        }
    }
}

#[derive(Debug)]
pub enum CommitOutcome {
    /// The built mesh is now the displayed mesh.
    Applied(MeshHandle),
    /// A newer request was issued while this one was building; the scene
    /// was left untouched.
    Superseded,
}

impl CommitOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, CommitOutcome::Applied(_))
    }

    pub fn handle(&self) -> Option<MeshHandle> {
        match self {
            CommitOutcome::Applied(handle) => Some(*handle),
            CommitOutcome::Superseded => None,
        }
    }
}

/// Owns everything one viewer displays: the scene slot, the camera, and the
/// orbit anchor, plus the last applied parameter snapshots. All mutation
/// goes through methods so the single-mesh and framing invariants hold.
pub struct ViewerSession {
    pub scene: SceneState,
    pub camera: PerspectiveCamera,
    pub orbit: OrbitAnchor,
    text_params: TextParams,
    material_params: MaterialParams,
    issued: u64,
}

impl ViewerSession {
    pub fn new() -> Self {
        Self {
            scene: SceneState::new(),
            camera: PerspectiveCamera::new(),
            orbit: OrbitAnchor::default(),
            text_params: TextParams::default(),
            material_params: MaterialParams::default(),
            issued: 0,
        }
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.camera.set_viewport(width, height);
    }

    pub fn text_params(&self) -> &TextParams {
        &self.text_params
    }

    pub fn material_params(&self) -> &MaterialParams {
        &self.material_params
    }

    pub fn mesh_handle(&self) -> Option<MeshHandle> {
        self.scene.mesh().map(MeshHandle::of)
    }

    /// What a new parameter snapshot would require, given what is applied.
    pub fn classify_update(&self, text: &TextParams, material: &MaterialParams) -> UpdateKind {
        UpdateKind::classify(&self.text_params, &self.material_params, text, material)
    }

    /// Issues a ticket for a rebuild. Issuing immediately supersedes every
    /// ticket still building, whether or not this one ever commits.
    pub fn begin_regenerate(&mut self, text: TextParams, material: MaterialParams) -> RegenTicket {
        self.issued += 1;
        log::debug!("regeneration {} issued for {:?}", self.issued, text.content);
        RegenTicket {
            token: RegenToken(self.issued),
            text,
            material,
        }
    }

    /// Lands a built geometry. The texture slot is read here, at commit
    /// time, so a texture applied while the build was in flight ends up on
    /// the new mesh. Stale tickets leave the scene, camera, and parameter
    /// snapshots exactly as they were.
    pub fn commit_mesh(&mut self, ticket: RegenTicket, geometry: TextGeometry) -> CommitOutcome {
        if ticket.token.0 != self.issued {
            log::info!(
                "discarding stale regeneration {:?}, a newer request was issued",
                ticket.token
            );
            return CommitOutcome::Superseded;
        }

        // The slot wins over the ticket's issue-time texture; an empty slot
        // falls back to whatever the ticket carried.
        let mut params = ticket.material.normalized();
        if let Some(texture) = self.material_params.texture.clone() {
            params.texture = Some(texture);
        }
        let material = Material::from_params(&params);
        let mut mesh = TextMesh::new(Arc::new(geometry), material);
        fit_view(&mut mesh, &mut self.camera, &mut self.orbit);
        let handle = MeshHandle::of(&mesh);
        self.scene.replace_mesh(mesh);

        self.text_params = ticket.text;
        self.material_params = params;
        log::info!(
            "mesh {:?} attached: {} triangles, camera at {:?}",
            handle.mesh,
            handle.triangles,
            self.camera.position
        );
        CommitOutcome::Applied(handle)
    }

    /// Patches appearance in place. Never rebuilds geometry; text changes
    /// must go through [`ViewerSession::begin_regenerate`].
    pub fn apply_material(&mut self, params: MaterialParams) -> UpdateKind {
        let params = params.normalized();
        let kind = UpdateKind::classify(
            &self.text_params,
            &self.material_params,
            &self.text_params,
            &params,
        );
        if kind == UpdateKind::MaterialPatch {
            if let Some(mesh) = self.scene.mesh_mut() {
                mesh.material.patch(&params);
            }
            self.material_params = params;
        }
        kind
    }

    /// Installs `texture` as the material map. Callers resolve their own
    /// races: whichever texture arrives here last is the one displayed.
    pub fn set_texture(&mut self, texture: TextureHandle) -> UpdateKind {
        log::info!("applying texture {}", texture.label);
        let params = self.material_params.clone().with_texture(Some(texture));
        self.apply_material(params)
    }

    /// Serializes the scene for download. A meshless session is a no-op,
    /// not an error; the viewer simply has nothing to save yet.
    pub fn export_glb(&self, options: &crate::export::ExportOptions) -> crate::error::Result<Option<Vec<u8>>> {
        if !self.scene.has_mesh() {
            log::warn!("export requested with no mesh attached");
            return Ok(None);
        }
        crate::export::encode_glb(&self.scene, options).map(Some)
    }
}

impl Default for ViewerSession {
    fn default() -> Self {
        Self::new()
    }
}
